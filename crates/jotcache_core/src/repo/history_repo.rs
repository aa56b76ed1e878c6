//! History collection stored under the `noteHistory` key.
//!
//! Entries of every note share one array; per-note filtering happens in the
//! service layer.

use crate::model::history::HistoryEntry;
use crate::repo::collection::{load_collection, save_collection};
use crate::repo::kv_repo::{KvRepository, RepoResult};

/// Key of the history collection inside the namespace.
pub const HISTORY_KEY: &str = "noteHistory";

/// Whole-collection view of persisted history entries.
pub struct HistoryRepository<'kv, R: KvRepository + ?Sized> {
    kv: &'kv R,
}

impl<'kv, R: KvRepository + ?Sized> HistoryRepository<'kv, R> {
    pub fn new(kv: &'kv R) -> Self {
        Self { kv }
    }

    pub fn load_all(&self) -> Vec<HistoryEntry> {
        load_collection(self.kv, HISTORY_KEY)
    }

    pub fn save_all(&self, entries: &[HistoryEntry]) -> RepoResult<()> {
        save_collection(self.kv, HISTORY_KEY, entries)
    }
}
