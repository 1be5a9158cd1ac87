use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::get_data_dir;

const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access settings file at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine a data directory: {0}")]
    DataDir(String),
}

/// Durable string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Returns whether the key was present.
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;
}

type Entries = BTreeMap<String, String>;

/// A JSON object on disk, re-read on every access so that separate processes
/// see each other's writes.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open_default() -> Result<Self, StoreError> {
        let data_dir = get_data_dir().map_err(|err| StoreError::DataDir(err.to_string()))?;
        Ok(Self::at(data_dir.join(SETTINGS_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Entries, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse_entries(&contents, &self.path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    fn write(&self, entries: &Entries) -> Result<(), StoreError> {
        let contents = serialize_entries(entries).map_err(|source| StoreError::Parse {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, contents).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }

        if entries.is_empty() {
            fs::remove_file(&self.path).map_err(|source| StoreError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
            return Ok(true);
        }

        self.write(&entries)?;
        Ok(true)
    }
}

fn parse_entries(contents: &str, path: &Path) -> Result<Entries, StoreError> {
    if contents.trim().is_empty() {
        return Ok(Entries::new());
    }

    serde_json::from_str(contents).map_err(|source| StoreError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn serialize_entries(entries: &Entries) -> Result<String, serde_json::Error> {
    let contents = serde_json::to_string_pretty(entries)?;
    Ok(format!("{}\n", contents))
}

/// In-process storage for tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Entries,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
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

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_entries_handles_empty() {
        let entries = parse_entries("   \n", Path::new("settings.json")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn serialize_entries_adds_trailing_newline() {
        let mut entries = Entries::new();
        entries.insert("gemini_api_key".to_string(), "test-key".to_string());

        let serialized = serialize_entries(&entries).unwrap();
        assert!(serialized.ends_with('\n'));
        let parsed: Entries = serde_json::from_str(serialized.trim()).unwrap();
        assert_eq!(
            parsed.get("gemini_api_key").map(String::as_str),
            Some("test-key")
        );
    }

    #[test]
    fn file_doesnt_exist() {
        let dir = tempdir().unwrap();
        let store = FileStore::at(dir.path().join("settings.json"));
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn overwrite_and_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = FileStore::at(&path);

        store.set("gemini_api_key", "fake_key").unwrap();
        store.set("gemini_api_key", "real_key").unwrap();
        assert_eq!(
            store.get("gemini_api_key").unwrap().as_deref(),
            Some("real_key")
        );

        assert!(store.remove("gemini_api_key").unwrap());
        assert!(!path.exists());
        assert!(!store.remove("gemini_api_key").unwrap());
    }

    #[test]
    fn remove_keeps_other_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = FileStore::at(&path);

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert!(store.remove("a").unwrap());

        let reopened = FileStore::at(&path);
        assert!(reopened.get("a").unwrap().is_none());
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::at(&path);
        assert!(matches!(store.get("a"), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::with_entry("a", "1");
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert!(store.remove("a").unwrap());
        assert!(store.get("a").unwrap().is_none());
    }
}
