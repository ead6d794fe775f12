//! Durable media behind the persistent store.
//!
//! A medium is a string-keyed string store with single-key atomicity and
//! nothing more, the same contract as browser local storage. [`FileMedium`]
//! keeps all records in one JSON document on disk; [`MemoryMedium`] keeps them
//! in process memory for tests and storage-less sessions.

use crate::error::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Raw string storage consumed by the persistent store.
pub trait DurableMedium: Send + Sync {
    /// Read the raw value stored under `key`.
    fn read_raw(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn write_raw(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_raw(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// In-memory medium. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    records: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryMedium {
    /// Create an empty medium.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.records
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))
    }
}

impl DurableMedium for MemoryMedium {
    fn read_raw(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write_raw(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

/// File-backed medium storing every record in a single JSON object.
///
/// Writes go to a sibling temp file that is then renamed over the original,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileMedium {
    /// Use the document at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, records: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        let mut records = self.load()?;
        f(&mut records);
        self.save(&records)
    }
}

impl DurableMedium for FileMedium {
    fn read_raw(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(self.load()?.remove(key))
    }

    fn write_raw(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|records| {
            records.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_raw(&self, key: &str) -> StorageResult<()> {
        self.update(|records| {
            records.remove(key);
        })
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(self.load()?.into_keys().collect())
    }
}
