//! Persistence adapter for favorites and read history.
//!
//! Two keys are used, [`FAVORITES_KEY`] and [`READ_HISTORY_KEY`], each holding
//! a JSON array of [`SavedArticle`]s. Writes are synchronous.

use crate::error::NewsError;
use crate::models::SavedArticle;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

pub const FAVORITES_KEY: &str = "favorites";
pub const READ_HISTORY_KEY: &str = "readHistory";

pub trait Persistence: Send + Sync {
    /// Items stored under `key`; an absent key is an empty list.
    fn load(&self, key: &str) -> Result<Vec<SavedArticle>, NewsError>;
    fn save(&self, key: &str, items: &[SavedArticle]) -> Result<(), NewsError>;
    fn remove(&self, key: &str) -> Result<(), NewsError>;
}

/// Keeps serialized lists in memory, like browser local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw serialized value under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.into());
    }
}

impl Persistence for MemoryStorage {
    fn load(&self, key: &str) -> Result<Vec<SavedArticle>, NewsError> {
        match self.raw(key) {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| NewsError::storage(key, e)),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, key: &str, items: &[SavedArticle]) -> Result<(), NewsError> {
        let raw = serde_json::to_string(items).map_err(|e| NewsError::storage(key, e))?;
        self.insert_raw(key, raw);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), NewsError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Persistence for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Vec<SavedArticle>, NewsError> {
        let path = self.path_for(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NewsError::storage(key, e)),
        };
        serde_json::from_str(&raw).map_err(|e| NewsError::storage(key, e))
    }

    fn save(&self, key: &str, items: &[SavedArticle]) -> Result<(), NewsError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| NewsError::storage(key, e))?;
        let raw = serde_json::to_string_pretty(items).map_err(|e| NewsError::storage(key, e))?;
        let path = self.path_for(key);
        std::fs::write(&path, raw).map_err(|e| NewsError::storage(key, e))?;
        debug!(path = %path.display(), count = items.len(), "Persisted list");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), NewsError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NewsError::storage(key, e)),
        }
    }
}
