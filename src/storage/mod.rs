// src/storage/mod.rs — Session persistence (the browser local-storage layer)
//
// Two keys, stored as plain strings the way local storage holds them:
//   chat_uuid      — the current session id
//   saved_chat_ids — JSON-encoded array of known session ids, newest first

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::infra::errors::BotifyError;

pub const CURRENT_SESSION_KEY: &str = "chat_uuid";
pub const KNOWN_SESSIONS_KEY: &str = "saved_chat_ids";

/// Raw string key/value access. Implementors only provide this; the session
/// accessors are derived from it.
pub trait KeyValueStore: Send {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), BotifyError>;
}

/// Persistence contract used by the chat store. Reads never fail.
pub trait SessionStorage: Send {
    fn current_session(&self) -> Option<String>;
    fn set_current_session(&mut self, id: &str) -> Result<(), BotifyError>;
    fn known_sessions(&self) -> Vec<String>;
    fn set_known_sessions(&mut self, ids: &[String]) -> Result<(), BotifyError>;
}

impl<T: KeyValueStore> SessionStorage for T {
    fn current_session(&self) -> Option<String> {
        self.get_item(CURRENT_SESSION_KEY)
    }

    fn set_current_session(&mut self, id: &str) -> Result<(), BotifyError> {
        self.set_item(CURRENT_SESSION_KEY, id)
    }

    fn known_sessions(&self) -> Vec<String> {
        match self.get_item(KNOWN_SESSIONS_KEY) {
            Some(raw) => parse_session_list(&raw),
            None => Vec::new(),
        }
    }

    fn set_known_sessions(&mut self, ids: &[String]) -> Result<(), BotifyError> {
        let encoded =
            serde_json::to_string(ids).map_err(|e| BotifyError::Storage(e.to_string()))?;
        self.set_item(KNOWN_SESSIONS_KEY, &encoded)
    }
}

/// Decode the stored session list. Anything that is not a JSON array of
/// strings reads as an empty list.
pub fn parse_session_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", KNOWN_SESSIONS_KEY, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_list() {
        assert_eq!(
            parse_session_list(r#"["b","a"]"#),
            vec!["b".to_string(), "a".to_string()]
        );
        assert!(parse_session_list("[]").is_empty());
    }

    #[test]
    fn test_parse_session_list_malformed() {
        assert!(parse_session_list("not json").is_empty());
        assert!(parse_session_list(r#"{"a":1}"#).is_empty());
        assert!(parse_session_list("[1,2]").is_empty());
        assert!(parse_session_list("").is_empty());
    }

    #[test]
    fn test_session_accessors_over_kv() {
        let mut s = MemoryStorage::new();
        assert!(s.current_session().is_none());
        assert!(s.known_sessions().is_empty());

        s.set_current_session("abc").unwrap();
        s.set_known_sessions(&["abc".to_string(), "xyz".to_string()])
            .unwrap();

        assert_eq!(s.current_session().as_deref(), Some("abc"));
        assert_eq!(s.known_sessions(), vec!["abc", "xyz"]);
        assert_eq!(
            s.get_item(KNOWN_SESSIONS_KEY).as_deref(),
            Some(r#"["abc","xyz"]"#)
        );
    }
}
