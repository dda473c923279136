use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Error writing to the key-value store
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("cannot write key '{key}': {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },
}

/// Local key-value persistence capability.
///
/// The task store and preferences write full serialized snapshots through
/// this port and read them back once at startup. Implementations never
/// interpret the payload.
pub trait KvStore {
    /// Read the value for a key; `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
    /// Write (replace) the value for a key.
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}

/// File-backed store: each key lives in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, std::io::Error> {
        fs::create_dir_all(dir)?;
        Ok(FileKvStore {
            dir: dir.to_path_buf(),
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        fs::write(self.key_path(key), value).map_err(|source| KvError::Write {
            key: key.to_string(),
            source,
        })
    }
}

/// In-memory store for tests. Clones share the same map, so a test can keep
/// a handle to inspect what the code under test persisted.
#[derive(Debug, Clone, Default)]
pub struct MemKvStore {
    map: Rc<RefCell<HashMap<String, String>>>,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, e.g. to simulate an existing snapshot.
    pub fn seed(&self, key: &str, value: &str) {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl KvStore for MemKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
