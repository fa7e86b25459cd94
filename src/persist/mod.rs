use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// Durable load/save of whole collections, keyed by collection name.
///
/// The store treats this as an external collaborator: it serializes a full
/// collection per mutation and hands the bytes over. A missing key loads as
/// `None`, not an error.
pub trait PersistenceAdapter: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// File-backed adapter: one `<key>.json` per collection under a data
/// directory. Saves go through a temp file and a rename, so a reader never
/// observes a partially written collection.
pub struct JsonFileAdapter {
    dir: PathBuf,
}

impl JsonFileAdapter {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PersistenceAdapter for JsonFileAdapter {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(bytes))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process adapter for tests and non-durable runs.
#[derive(Default)]
pub struct MemoryAdapter {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = JsonFileAdapter::new(dir.path()).unwrap();
        assert!(adapter.load("clients").unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = JsonFileAdapter::new(dir.path()).unwrap();
        adapter.save("orders", b"[]").unwrap();
        assert_eq!(adapter.load("orders").unwrap().unwrap(), b"[]");
    }

    #[test]
    fn save_replaces_previous_contents() {
        let adapter = MemoryAdapter::new();
        adapter.save("settings", b"{\"a\":1}").unwrap();
        adapter.save("settings", b"{\"a\":2}").unwrap();
        assert_eq!(adapter.load("settings").unwrap().unwrap(), b"{\"a\":2}");
    }
}
