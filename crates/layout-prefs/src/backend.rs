//! Key/value backends for the preference record.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{PrefsError, Result};

/// Raw string storage keyed by namespace.
pub trait StorageBackend: Send + Sync {
    /// Stored value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Replace the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Remove `key`; removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Process-local backend used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Stored values.
    values: Mutex<HashMap<String, String>>,
    /// Successful `set` and `delete` calls.
    writes: AtomicU64,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization.
    pub fn with_raw(key: &str, raw: &str) -> Self {
        let b = Self::new();
        b.values.lock().insert(key.to_string(), raw.to_string());
        b
    }

    /// Raw stored value, for assertions.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Number of writes and deletes so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Shared backends, so a caller can keep inspecting a backend it handed over.
impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a
/// concurrent reader sees either the old or the new record.
#[derive(Debug, Clone)]
pub struct FileBackend {
    /// Directory holding the records.
    dir: PathBuf,
}

impl FileBackend {
    /// Store records under `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for `key`, rejecting keys that would escape the directory.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let ok = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !ok {
            return Err(PrefsError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PrefsError::io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| PrefsError::io(&self.dir, e))?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|e| PrefsError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| PrefsError::io(&path, e))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PrefsError::io(path, e)),
        }
    }
}
