use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::num::NonZeroUsize;
use tracing::{info, warn};

use super::backend::KeyValueStore;
use crate::scoring::AnalysisResult;

/// Storage key holding the serialized history array.
pub const HISTORY_KEY: &str = "bs-detector-history";

/// Maximum number of entries kept; older ones are dropped first.
pub const HISTORY_CAPACITY: usize = 30;

/// Newest-first, size-bounded log of past analyses.
///
/// Nothing is cached in memory: every call reads (and `record`/`clear` write)
/// the backend, so the backend is the single source of truth. `record` is a
/// read-modify-write and is not safe against concurrent writers.
pub struct HistoryStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Current history, newest first.
    ///
    /// Missing, unreadable or malformed data all come back as an empty list.
    pub fn list(&self) -> Vec<AnalysisResult> {
        let bytes = match self.backend.read(HISTORY_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("History unreadable, starting fresh: {:#}", e);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<AnalysisResult>>(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("History is corrupt, starting fresh: {}", e);
                Vec::new()
            }
        }
    }

    /// Prepend `result`, drop anything past capacity, persist, and return the
    /// stored list.
    pub fn record(&mut self, result: AnalysisResult) -> Result<Vec<AnalysisResult>> {
        let mut entries = self.list();
        entries.insert(0, result);
        entries.truncate(HISTORY_CAPACITY);

        self.persist(&entries)?;
        info!(entries = entries.len(), "history recorded");
        Ok(entries)
    }

    /// Reset to an empty history by dropping the key; a missing key lists as
    /// empty.
    pub fn clear(&mut self) -> Result<()> {
        self.backend
            .remove(HISTORY_KEY)
            .context("Failed to clear history")?;
        info!("history cleared");
        Ok(())
    }

    /// Entries checked at or after `since`, newest first, at most `limit` of
    /// them.
    pub fn recent(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<NonZeroUsize>,
    ) -> Vec<AnalysisResult> {
        let mut entries = self.list();
        if let Some(cutoff) = since {
            entries.retain(|entry| entry.checked_at >= cutoff);
        }
        if let Some(limit) = limit {
            entries.truncate(limit.get());
        }
        entries
    }

    fn persist(&mut self, entries: &[AnalysisResult]) -> Result<()> {
        let json = serde_json::to_vec(entries).context("Failed to serialize history")?;
        self.backend
            .write(HISTORY_KEY, &json)
            .context("Failed to save history")
    }
}
