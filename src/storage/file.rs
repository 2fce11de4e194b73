// src/storage/file.rs — JSON file standing in for browser local storage
//
// The file is one JSON object of string values. It is read on open and again
// before every set, so keys written by another botify process survive, then
// rewritten atomically (temp file + rename).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::infra::errors::BotifyError;

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file. A missing or malformed file
    /// starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = read_items(&path);
        Self { path, items }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), BotifyError> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(&self.items)
            .map_err(|e| BotifyError::Storage(e.to_string()))?;
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("local-storage.json");
        let tmp = dir.join(format!(".{file_name}.tmp"));

        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        f.flush()?;
        f.sync_all()?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn read_items(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };
    match serde_json::from_str(&content) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Ignoring malformed storage file {}: {}", path.display(), e);
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), BotifyError> {
        self.items = read_items(&self.path);
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
