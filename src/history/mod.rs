pub mod backend;
pub mod store;

pub use backend::{CacheStore, FileStore, KeyValueStore, MemoryStore};
pub use store::{HistoryStore, HISTORY_CAPACITY, HISTORY_KEY};

use std::path::PathBuf;

use crate::config::{HistoryBackend, HistoryConfig};

/// Get the platform-appropriate data directory for bs-detector
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("bs-detector"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.local/share/bs-detector",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Open the history store described by the config.
///
/// The file backend writes `<dir>/bs-detector-history.json`; the cache
/// backend keeps its cacache index under `<dir>/cache`.
pub fn open_history(config: &HistoryConfig) -> HistoryStore<Box<dyn KeyValueStore>> {
    let dir = config.dir.clone().unwrap_or_else(get_data_dir);
    let backend: Box<dyn KeyValueStore> = match config.backend {
        HistoryBackend::File => Box::new(FileStore::new(dir)),
        HistoryBackend::Cache => Box::new(CacheStore::new(dir.join("cache"))),
        HistoryBackend::Memory => Box::new(MemoryStore::new()),
    };
    tracing::debug!(backend = ?config.backend, "history store opened");
    HistoryStore::new(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::analyze;

    #[test]
    fn test_open_file_backend_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = HistoryConfig {
            backend: HistoryBackend::File,
            dir: Some(dir.path().to_path_buf()),
        };

        let mut store = open_history(&config);
        store.record(analyze("a claim worth keeping")).unwrap();

        assert!(dir.path().join("bs-detector-history.json").exists());
        assert_eq!(open_history(&config).list().len(), 1);
    }

    #[test]
    fn test_open_cache_backend_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = HistoryConfig {
            backend: HistoryBackend::Cache,
            dir: Some(dir.path().to_path_buf()),
        };

        let mut store = open_history(&config);
        store.record(analyze("cached")).unwrap();

        assert!(dir.path().join("cache").exists());
        assert_eq!(open_history(&config).list().len(), 1);
    }

    #[test]
    fn test_memory_backend_does_not_persist() {
        let config = HistoryConfig {
            backend: HistoryBackend::Memory,
            dir: None,
        };

        let mut store = open_history(&config);
        store.record(analyze("gone soon")).unwrap();
        assert_eq!(store.list().len(), 1);
        assert!(open_history(&config).list().is_empty());
    }
}
