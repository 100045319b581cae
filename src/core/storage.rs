//! Key-value persistence behind the user and post stores.
//!
//! Values are whole documents: every write replaces the previous value for
//! the key, there is no merge and no partial write. Reads are tolerant, a
//! missing or malformed document yields the caller's fallback.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait KeyValue {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Read a JSON document, degrading to `fallback` when it is absent or unreadable.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValue, key: &str, fallback: T) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return fallback,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, using fallback");
            return fallback;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "corrupt document, using fallback");
            fallback
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValue, key: &str, value: &T) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Process-local map, used by tests and anywhere nothing must outlive the run.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl KeyValue for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.data()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.data()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.data()?.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("creating store directory {}", root.display()))?;
        Ok(Self { root })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValue for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading key {key}")),
        }
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        // Rename keeps readers from ever seeing a half-written document
        let tmp = self.root.join(format!(".{key}.tmp"));
        fs::write(&tmp, value).with_context(|| format!("writing key {key}"))?;
        fs::rename(&tmp, self.path(key)).with_context(|| format!("replacing key {key}"))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("deleting key {key}")),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub struct SpinStore {
    inner: spin_sdk::key_value::Store,
}

#[cfg(target_arch = "wasm32")]
impl SpinStore {
    pub fn open_default() -> anyhow::Result<Self> {
        let inner = spin_sdk::key_value::Store::open_default()
            .map_err(|e| anyhow::anyhow!("opening key-value store: {e:?}"))?;
        Ok(Self { inner })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValue for SpinStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let bytes = self
            .inner
            .get(key)
            .map_err(|e| anyhow::anyhow!("reading key {key}: {e:?}"))?;
        bytes.map(String::from_utf8).transpose().map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.inner
            .set(key, value.as_bytes())
            .map_err(|e| anyhow::anyhow!("writing key {key}: {e:?}"))
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.inner
            .delete(key)
            .map_err(|e| anyhow::anyhow!("deleting key {key}: {e:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_fallback_for_missing_key() {
        let store = MemoryStore::new();
        let value: Vec<String> = read_json(&store, "posts", vec!["x".to_string()]);
        assert_eq!(value, vec!["x".to_string()]);
    }

    #[test]
    fn read_returns_fallback_for_corrupt_json() {
        let store = MemoryStore::new();
        store.set("users", "{not json").unwrap();
        let value: HashMap<String, u32> = read_json(&store, "users", HashMap::new());
        assert!(value.is_empty());
    }

    #[test]
    fn write_replaces_whole_value() {
        let store = MemoryStore::new();
        write_json(&store, "posts", &vec![1, 2, 3]).unwrap();
        write_json(&store, "posts", &vec![4]).unwrap();
        let value: Vec<u32> = read_json(&store, "posts", Vec::new());
        assert_eq!(value, vec![4]);
    }

    #[test]
    fn file_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            write_json(&store, "posts", &vec!["a"]).unwrap();
            store.set("currentUser", "alice").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        let posts: Vec<String> = read_json(&store, "posts", Vec::new());
        assert_eq!(posts, vec!["a".to_string()]);
        assert_eq!(store.get("currentUser").unwrap().as_deref(), Some("alice"));

        store.delete("currentUser").unwrap();
        store.delete("currentUser").unwrap();
        assert_eq!(store.get("currentUser").unwrap(), None);
    }
}
