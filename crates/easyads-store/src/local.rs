// ABOUTME: Key/value storage in one JSON file, written with atomic rename for crash safety.
// ABOUTME: Implements TokenStore so the session token survives process restarts.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use easyads_core::{StorageError, TOKEN_KEY, TokenStore};
use serde_json::{Map, Value};

/// File name of the storage document inside the home directory.
pub const STORAGE_FILE: &str = "storage.json";

/// String values keyed by name, persisted as a JSON object.
/// Every write rewrites the whole document via temp file + fsync + rename.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Open storage rooted at `home`. Creates the directory if it does not exist.
    pub fn open(home: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(home)?;
        Ok(Self {
            path: home.join(STORAGE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let doc = self.read()?;
        Ok(doc.get(key).and_then(Value::as_str).map(str::to_string))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut doc = self.read_for_write()?;
        doc.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&doc)
    }

    /// Remove `key`. Removing a missing key leaves the file untouched.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut doc = self.read_for_write()?;
        if doc.remove(key).is_some() {
            self.write(&doc)?;
        }
        Ok(())
    }

    fn read(&self) -> Result<Map<String, Value>, StorageError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// The document to apply a write to. An unparseable document is replaced
    /// rather than blocking every later write; IO errors still fail.
    fn read_for_write(&self) -> Result<Map<String, Value>, StorageError> {
        match self.read() {
            Err(StorageError::Json(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "storage document is corrupt; replacing it");
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn write(&self, doc: &Map<String, Value>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(doc)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), "storage written");
        Ok(())
    }
}

impl TokenStore for LocalStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        self.get(TOKEN_KEY)
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        self.set(TOKEN_KEY, token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.remove(TOKEN_KEY)
    }
}
