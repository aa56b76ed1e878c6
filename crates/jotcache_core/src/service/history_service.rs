//! History use-case service.
//!
//! # Responsibility
//! - List, read and delete history entries of a note.
//! - Restore a snapshot through the regular note update path.
//!
//! # Invariants
//! - Lists are sorted by `created_at DESC`.
//! - Restore runs lookup, update and policy evaluation in one lane
//!   acquisition.

use crate::model::history::{HistoryEntry, HistoryEntryId};
use crate::model::note::NoteId;
use crate::repo::history_repo::HistoryRepository;
use crate::repo::kv_repo::KvRepository;
use crate::service::note_service::{now_epoch_ms, persist_history, update_in_lane, UpdateOutcome};
use crate::service::shared_store::SharedStore;
use log::info;
use std::cmp::Reverse;

/// History service bound to one shared store.
pub struct HistoryService<'s, R: KvRepository> {
    store: &'s SharedStore<R>,
}

impl<'s, R: KvRepository> HistoryService<'s, R> {
    pub(crate) fn new(store: &'s SharedStore<R>) -> Self {
        Self { store }
    }

    /// Entries of `note_id`, newest first.
    pub fn list(&self, note_id: NoteId) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self.store.with_lane(|kv| {
            HistoryRepository::new(kv)
                .load_all()
                .into_iter()
                .filter(|entry| entry.note_id == note_id)
                .collect()
        });
        entries.sort_by_key(|entry| Reverse(entry.created_at));
        entries
    }

    pub fn get(&self, entry_id: HistoryEntryId) -> Option<HistoryEntry> {
        self.store.with_lane(|kv| {
            HistoryRepository::new(kv)
                .load_all()
                .into_iter()
                .find(|entry| entry.id == entry_id)
        })
    }

    /// Removes one entry. Returns `false` when it did not exist.
    pub fn delete(&self, entry_id: HistoryEntryId) -> bool {
        self.store.with_lane(|kv| {
            let mut history = HistoryRepository::new(kv).load_all();
            let before = history.len();
            history.retain(|entry| entry.id != entry_id);
            let removed = history.len() != before;
            if removed {
                persist_history(kv, &history, "history_delete");
            }
            info!(
                "event=history_delete module=history status=ok entry_id={entry_id} removed={removed}"
            );
            removed
        })
    }

    /// Removes every entry of `note_id` and returns how many were removed.
    pub fn clear(&self, note_id: NoteId) -> usize {
        self.store.with_lane(|kv| {
            let mut history = HistoryRepository::new(kv).load_all();
            let before = history.len();
            history.retain(|entry| entry.note_id != note_id);
            let removed = before - history.len();
            if removed > 0 {
                persist_history(kv, &history, "history_clear");
            }
            info!(
                "event=history_clear module=history status=ok note_id={note_id} removed={removed}"
            );
            removed
        })
    }

    /// Copies the entry's content back into its note, stamped now.
    ///
    /// Returns `None` when the entry does not exist. The policy decides as
    /// for any other update whether the restore becomes a new snapshot.
    pub fn restore(&self, entry_id: HistoryEntryId) -> Option<UpdateOutcome> {
        self.restore_at(entry_id, now_epoch_ms())
    }

    pub fn restore_at(&self, entry_id: HistoryEntryId, now: i64) -> Option<UpdateOutcome> {
        let restored = self.store.with_lane(|kv| {
            let entry = HistoryRepository::new(kv)
                .load_all()
                .into_iter()
                .find(|entry| entry.id == entry_id)?;
            info!(
                "event=history_restore module=history status=start entry_id={} note_id={}",
                entry_id, entry.note_id
            );
            Some(update_in_lane(
                kv,
                self.store.policy(),
                entry.note_id,
                entry.content,
                now,
            ))
        });

        let (outcome, written) = restored?;
        if written {
            self.store.notify_saved();
        }
        Some(outcome)
    }
}
