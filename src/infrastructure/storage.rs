//! Key-value storage backends for form snapshots.

use crate::domain::StorageResult;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

/// A string-keyed, string-valued store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Writes several entries. Backends that can batch the write should
    /// override this so that either every entry lands or none does.
    fn set_all(&mut self, entries: &[(&str, &str)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Removes several keys. Backends that can batch the removal should override this.
    fn remove_all(&mut self, keys: &[&str]) -> StorageResult<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// In-process store used by tests and as a fallback when no file store can be opened.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The whole file is rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file yields an empty store, and so
    /// does a file that is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(
                        "Ignoring unreadable store {}: {err}",
                        path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, entries })
    }

    /// Writes `entries` to disk and adopts them only once the write succeeded.
    fn commit(&mut self, entries: BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)?;
        self.entries = entries;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.set_all(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.remove_all(&[key])
    }

    fn set_all(&mut self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let mut next = self.entries.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value.to_string());
        }
        self.commit(next)
    }

    fn remove_all(&mut self, keys: &[&str]) -> StorageResult<()> {
        if !keys.iter().any(|key| self.entries.contains_key(*key)) {
            return Ok(());
        }
        let mut next = self.entries.clone();
        for key in keys {
            next.remove(*key);
        }
        self.commit(next)
    }
}
