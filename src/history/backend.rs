use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use cacache::Integrity;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Minimal persistent key-value storage the history log sits on.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// One JSON file per key inside a directory, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).with_context(|| {
                format!("Failed to create history directory at {}", self.dir.display())
            })?;
        }

        let path = self.path_for(key);
        let mut file = AtomicWriteFile::open(&path)
            .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
        file.write_all(value)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.commit()
            .with_context(|| format!("Failed to save {}", path.display()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

/// Disk-persistent store backed by cacache.
///
/// cacache is content-addressed, so every write of a new value leaves a new
/// blob behind. Superseded blobs are removed once no key points at them, which
/// keeps the content directory at one blob per live key.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_path: PathBuf,
}

impl CacheStore {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
        }
    }

    fn current_integrity(&self, key: &str) -> Option<Integrity> {
        match cacache::metadata_sync(&self.cache_path, key) {
            Ok(meta) => meta.map(|m| m.integrity),
            Err(e) => {
                warn!("Failed to look up '{}' in {}: {}", key, self.cache_path.display(), e);
                None
            }
        }
    }

    /// Delete a content blob unless some live key still references it.
    fn prune(&self, stale: &Integrity) {
        let referenced = cacache::list_sync(&self.cache_path)
            .filter_map(|entry| entry.ok())
            .any(|meta| meta.integrity == *stale);
        if referenced {
            return;
        }

        // The new value is already committed; a leftover blob only costs disk
        if let Err(e) = cacache::remove_hash_sync(&self.cache_path, stale) {
            warn!("Failed to prune stale cache content: {}", e);
        }
    }
}

impl KeyValueStore for CacheStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match cacache::read_sync(&self.cache_path, key) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(cacache::Error::EntryNotFound(..)) => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read '{}' from {}", key, self.cache_path.display())
            }),
        }
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let previous = self.current_integrity(key);
        let written = cacache::write_sync(&self.cache_path, key, value).with_context(|| {
            format!("Failed to write '{}' to {}", key, self.cache_path.display())
        })?;

        if let Some(previous) = previous.filter(|p| *p != written) {
            self.prune(&previous);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let previous = self.current_integrity(key);
        cacache::remove_sync(&self.cache_path, key).with_context(|| {
            format!("Failed to remove '{}' from {}", key, self.cache_path.display())
        })?;

        if let Some(previous) = previous {
            self.prune(&previous);
        }
        Ok(())
    }
}

/// Process-local store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
