// src/infra/paths.rs — Path management
//
// All paths respect the BOTIFY_HOME environment variable for isolation.
// When BOTIFY_HOME is set, config and data live under that directory.
// When unset, config uses ~/.botify/ and data uses the platform data dir.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the BOTIFY_HOME override, if set.
fn botify_home() -> Option<PathBuf> {
    std::env::var_os("BOTIFY_HOME").map(PathBuf::from)
}

/// Configuration directory: $BOTIFY_HOME/ or ~/.botify/
pub fn config_dir() -> PathBuf {
    if let Some(home) = botify_home() {
        return home;
    }
    match BaseDirs::new() {
        Some(base) => base.home_dir().join(".botify"),
        None => PathBuf::from(".botify"),
    }
}

/// Data directory: $BOTIFY_HOME/data/ or ~/.local/share/botify/ (platform equivalent)
pub fn data_dir() -> PathBuf {
    if let Some(home) = botify_home() {
        return home.join("data");
    }
    match ProjectDirs::from("", "", "botify") {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        None => config_dir().join("data"),
    }
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Session storage file (the local-storage equivalent)
pub fn storage_path() -> PathBuf {
    data_dir().join("local-storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_their_dirs() {
        assert!(config_file_path().starts_with(config_dir()));
        assert!(storage_path().starts_with(data_dir()));
        assert_eq!(
            storage_path().file_name().and_then(|n| n.to_str()),
            Some("local-storage.json")
        );
    }
}
