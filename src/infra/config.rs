// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::BotifyError;
use crate::infra::paths;

/// Backend URL used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Environment variable selecting the backend. Read at build time for the
/// compiled-in default and again at runtime as an override.
pub const BACKEND_URL_ENV: &str = "BOTIFY_BACKEND_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    /// Bounds connection setup only. Streamed replies have no timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the location of the session storage file.
    pub path: Option<String>,
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Pick the backend URL: CLI flag > runtime env > config file > build-time env > default.
    pub fn backend_url(&self, cli_override: Option<&str>) -> Result<String, BotifyError> {
        let runtime_env = std::env::var(BACKEND_URL_ENV).ok();
        self.resolve_backend_url(cli_override, runtime_env.as_deref())
    }

    pub fn resolve_backend_url(
        &self,
        cli_override: Option<&str>,
        runtime_env: Option<&str>,
    ) -> Result<String, BotifyError> {
        let raw = cli_override
            .or(runtime_env)
            .or(self.backend.base_url.as_deref())
            .or(option_env!("BOTIFY_BACKEND_URL"))
            .unwrap_or(DEFAULT_BACKEND_URL)
            .trim();
        normalize_base_url(raw)
    }

    pub fn storage_path(&self) -> PathBuf {
        match self.storage.path {
            Some(ref p) => PathBuf::from(p),
            None => paths::storage_path(),
        }
    }
}

/// Validate a base URL and strip trailing slashes so `{base}/chat/new` joins cleanly.
pub fn normalize_base_url(raw: &str) -> Result<String, BotifyError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| BotifyError::Config(format!("invalid backend URL '{raw}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BotifyError::Config(format!(
            "backend URL must be http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert!(c.backend.base_url.is_none());
        assert_eq!(c.backend.connect_timeout_secs, 10);
        assert!(c.storage.path.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backend.connect_timeout_secs, 10);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[backend]
base_url = "https://chat.example.com/"
connect_timeout_secs = 3

[storage]
path = "/tmp/botify-storage.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("https://chat.example.com/")
        );
        assert_eq!(config.backend.connect_timeout_secs, 3);
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/botify-storage.json")
        );
    }

    #[test]
    fn test_backend_url_precedence() {
        let mut config = Config::default();
        config.backend.base_url = Some("http://from-config:9000".into());

        let url = config
            .resolve_backend_url(Some("http://from-flag:1"), Some("http://from-env:2"))
            .unwrap();
        assert_eq!(url, "http://from-flag:1");

        let url = config
            .resolve_backend_url(None, Some("http://from-env:2"))
            .unwrap();
        assert_eq!(url, "http://from-env:2");

        let url = config.resolve_backend_url(None, None).unwrap();
        assert_eq!(url, "http://from-config:9000");
    }

    #[test]
    fn test_backend_url_default() {
        let url = Config::default().resolve_backend_url(None, None).unwrap();
        let expected = option_env!("BOTIFY_BACKEND_URL").unwrap_or(DEFAULT_BACKEND_URL);
        assert_eq!(url, expected.trim_end_matches('/'));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        assert_eq!(
            normalize_base_url("http://localhost:8000//").unwrap(),
            "http://localhost:8000"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(BotifyError::Config(_))
        ));
        assert!(matches!(
            normalize_base_url("ftp://example.com"),
            Err(BotifyError::Config(_))
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
