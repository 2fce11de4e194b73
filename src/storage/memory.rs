// src/storage/memory.rs — In-process storage (tests, --ephemeral)

use std::collections::HashMap;

use super::KeyValueStore;
use crate::infra::errors::BotifyError;

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key, e.g. to simulate a previous visit.
    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), BotifyError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
