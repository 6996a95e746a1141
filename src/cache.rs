//! Cache repositories.
//!
//! docket only needs `get` and `put`; expiry and eviction belong entirely to
//! the backend. Values are JSON so any backend (memory, files, a shared
//! key-value service) can hold them.
//!
//! A `put` publishes the whole value at once: readers see either the previous
//! value or the new one, never a partial write.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::Error;

/// A pluggable key-value cache backend.
pub trait CacheStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<Value>, Error>;
    fn put(&self, key: &str, value: Value) -> Result<(), Error>;
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// Process-wide in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), Error> {
        self.entries.write().insert(key.to_owned(), value);
        Ok(())
    }
}

// ── File ──────────────────────────────────────────────────────────────────────

/// One JSON file per key under a directory.
///
/// Writes go to a temporary file in the same directory and are renamed into
/// place.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    seq: AtomicU64,
}

impl FileStore {
    /// Opens (and creates if needed) the cache directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, seq: AtomicU64::new(0) })
    }

    /// Keeps `[A-Za-z0-9.-]` and writes every other byte as `_XX`, so two
    /// distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut file = String::with_capacity(key.len() + 5);
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'.' {
                file.push(char::from(b));
            } else {
                file.push_str(&format!("_{b:02X}"));
            }
        }
        file.push_str(".json");
        self.dir.join(file)
    }

    fn write_synced(path: &Path, value: &Value) -> Result<(), Error> {
        let mut file = fs::File::create(path)?;
        file.write_all(&serde_json::to_vec(value)?)?;
        file.sync_all()?;
        Ok(())
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: Value) -> Result<(), Error> {
        let target = self.path_for(key);
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let stem = target.file_name().and_then(|n| n.to_str()).unwrap_or("entry");
        let tmp = self.dir.join(format!(".{stem}.{}.{seq}.tmp", std::process::id()));

        let published = Self::write_synced(&tmp, &value)
            .and_then(|()| fs::rename(&tmp, &target).map_err(Error::from));
        if published.is_err() {
            // The temp file may not exist if creation itself failed.
            let _ = fs::remove_file(&tmp);
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_get_put() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.put("a", json!([1, 2])).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!([1, 2])));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = "my_app::controllers::Models";
        {
            let store = FileStore::open(dir.path()).unwrap();
            assert_eq!(store.get(key).unwrap(), None);
            store.put(key, json!({"routes": []})).unwrap();
        }
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get(key).unwrap(), Some(json!({"routes": []})));

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn file_store_keeps_lookalike_keys_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("shop::users", json!("colons")).unwrap();
        store.put("shop__users", json!("underscores")).unwrap();
        store.put("shop_3A_3Ausers", json!("escaped")).unwrap();

        assert_eq!(store.get("shop::users").unwrap(), Some(json!("colons")));
        assert_eq!(store.get("shop__users").unwrap(), Some(json!("underscores")));
        assert_eq!(store.get("shop_3A_3Ausers").unwrap(), Some(json!("escaped")));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn failed_put_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let blocked = store.path_for("blocked");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("occupant"), b"").unwrap();

        assert!(matches!(store.put("blocked", json!(1)), Err(Error::Io(_))));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["blocked.json".to_owned()]);
    }

    #[test]
    fn file_store_reports_corrupt_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::write(store.path_for("bad"), b"{not json").unwrap();
        assert!(matches!(store.get("bad"), Err(Error::Json(_))));
    }
}
