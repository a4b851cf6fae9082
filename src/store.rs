use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key under which the comma-joined token list is persisted.
pub const HF_TOKEN_KEY: &str = "huggingFaceToken";
/// Key under which the exhausted-token list (JSON array) is persisted.
pub const EXHAUSTED_TOKENS_KEY: &str = "huggingFaceExhaustedTokens";
/// Key under which the selected UI language code is persisted.
pub const LANGUAGE_KEY: &str = "appLanguage";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store file {path} is not a JSON object of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize store contents: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous string key-value storage.
///
/// Absent keys read as `Ok(None)`; callers decide what the default is.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Volatile store, used by tests and by `--dry-run`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `keys` from another store. Later writes stay in memory.
    pub fn seeded_from(source: &impl KeyValueStore, keys: &[&str]) -> Result<Self, StoreError> {
        let mut store = MemoryStore::new();
        for key in keys {
            if let Some(value) = source.get(key)? {
                store.set(key, &value)?;
            }
        }
        Ok(store)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, e.g. `{"huggingFaceToken": "hf_a,hf_b"}`.
///
/// The file is re-read on every `get` so that edits made by another process
/// between dialog openings are picked up. Writes go through a sibling temp
/// file followed by a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<config_dir>/hf-settings/store.json`, or `./hf-settings-store.json`
    /// when the platform has no config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("hf-settings").join("store.json"))
            .unwrap_or_else(|| PathBuf::from("hf-settings-store.json"))
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let serialized = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = fs::File::create(&tmp_path).map_err(io_err)?;
        tmp.write_all(serialized.as_bytes()).map_err(io_err)?;
        tmp.sync_all().map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.read_all()?;
        Ok(match entries.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            // Non-string values are not ours; surface them verbatim.
            Some(other) => Some(other.to_string()),
            None => None,
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&entries)?;
        log::debug!("stored {} ({} bytes) in {}", key, value.len(), self.path.display());
        Ok(())
    }
}
