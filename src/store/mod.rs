pub mod profile;
pub mod trips;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistenceError;

pub const TRIPS_KEY: &str = "trips";
pub const PROFILE_KEY: &str = "userProfile";
pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_EMAIL_KEY: &str = "userEmail";

/// Durable key-value slots, each holding one JSON document.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Why a slot could not be turned back into a value.
#[derive(Debug)]
pub enum LoadFailure {
    Missing,
    Unreadable(io::Error),
    Corrupt(serde_json::Error),
}

pub fn read_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Result<T, LoadFailure> {
    let raw = kv
        .get(key)
        .map_err(LoadFailure::Unreadable)?
        .ok_or(LoadFailure::Missing)?;
    serde_json::from_slice(&raw).map_err(LoadFailure::Corrupt)
}

pub fn write_json<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let data = serde_json::to_vec_pretty(value)?;
    kv.set(key, &data)?;
    Ok(())
}

/// One `<key>.json` file per slot inside a directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.slot_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.slot_path(key);
        // Slot contents are only ever replaced whole, via rename
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.slot_path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local slots for previews and tests.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.slots().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> io::Result<()> {
        self.slots().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.slots().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_slots() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.get("trips").unwrap(), None);
        store.set("trips", b"[]").unwrap();
        assert_eq!(store.get("trips").unwrap(), Some(b"[]".to_vec()));
        assert!(store.slot_path("trips").exists());

        store.remove("trips").unwrap();
        store.remove("trips").unwrap();
        assert_eq!(store.get("trips").unwrap(), None);
    }

    #[test]
    fn read_json_distinguishes_missing_and_corrupt() {
        let store = MemoryStore::new();
        assert!(matches!(
            read_json::<Vec<u32>>(&store, "numbers"),
            Err(LoadFailure::Missing)
        ));

        store.set("numbers", b"{ nope").unwrap();
        assert!(matches!(
            read_json::<Vec<u32>>(&store, "numbers"),
            Err(LoadFailure::Corrupt(_))
        ));

        write_json(&store, "numbers", &[1u32, 2, 3]).unwrap();
        assert_eq!(read_json::<Vec<u32>>(&store, "numbers").unwrap(), vec![1, 2, 3]);
    }
}
