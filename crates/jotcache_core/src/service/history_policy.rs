//! Snapshot decision, capture and pruning for note history.
//!
//! # Responsibility
//! - Decide on every note update whether to capture a history snapshot.
//! - Deduplicate unchanged content by content hash.
//! - Bound retention per note.
//!
//! # Invariants
//! - Content equal (by hash) to the latest snapshot is never captured again,
//!   regardless of elapsed time.
//! - Pruning only ever removes entries of the note being updated.
//! - Callers run `evaluate` inside the store lane, right after the note write.

use crate::config::HistoryPolicyConfig;
use crate::model::codec::content_hash;
use crate::model::history::{HistoryEntry, HistoryEntryId};
use crate::model::note::{Note, NoteId};
use crate::repo::history_repo::HistoryRepository;
use crate::repo::kv_repo::KvRepository;
use log::{debug, error};
use std::cmp::Reverse;

/// Result of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotDecision {
    /// Content hash equals the latest snapshot of this note.
    Duplicate,
    /// Neither the interval nor the length threshold was reached.
    BelowThreshold,
    /// A new entry was captured and persisted.
    Captured(HistoryEntryId),
}

/// History policy configured with thresholds and retention.
#[derive(Debug, Clone, Default)]
pub struct HistoryPolicy {
    config: HistoryPolicyConfig,
}

impl HistoryPolicy {
    pub fn new(config: HistoryPolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HistoryPolicyConfig {
        &self.config
    }

    /// Evaluates `updated` and captures a snapshot when warranted.
    ///
    /// `previous` is the note before the update. The decision itself only
    /// looks at the latest stored snapshot, so `previous` is logged but does
    /// not influence the outcome.
    pub fn evaluate<R: KvRepository + ?Sized>(
        &self,
        kv: &R,
        previous: &Note,
        updated: &Note,
        now: i64,
    ) -> SnapshotDecision {
        let repo = HistoryRepository::new(kv);
        let mut history = repo.load_all();
        let hash = content_hash(&updated.content);

        let latest = history
            .iter()
            .filter(|entry| entry.note_id == updated.id)
            .max_by_key(|entry| entry.created_at);

        if latest.is_some_and(|entry| entry.content_hash == hash) {
            debug!(
                "event=history_evaluate module=history status=skipped reason=duplicate note_id={}",
                updated.id
            );
            return SnapshotDecision::Duplicate;
        }

        if !self.should_snapshot(latest, updated, now) {
            debug!(
                "event=history_evaluate module=history status=skipped reason=below_threshold note_id={} previous_len={}",
                updated.id,
                previous.plain_text_len()
            );
            return SnapshotDecision::BelowThreshold;
        }

        let entry = HistoryEntry::capture(updated, hash, now);
        let entry_id = entry.id;
        history.push(entry);
        let pruned = prune_history(history, updated.id, self.config.retention_limit);

        match repo.save_all(&pruned) {
            Ok(()) => debug!(
                "event=history_evaluate module=history status=ok note_id={} entry_id={}",
                updated.id, entry_id
            ),
            Err(err) => error!(
                "event=history_evaluate module=history status=error note_id={} error_code=history_write_failed error={}",
                updated.id, err
            ),
        }
        SnapshotDecision::Captured(entry_id)
    }

    /// Threshold check against the latest snapshot of the same note.
    ///
    /// A note without snapshots always qualifies.
    pub fn should_snapshot(&self, latest: Option<&HistoryEntry>, updated: &Note, now: i64) -> bool {
        let Some(latest) = latest else {
            return true;
        };
        let elapsed = now.saturating_sub(latest.created_at);
        let length_delta = updated.plain_text_len().abs_diff(latest.plain_text_len());
        elapsed >= self.config.min_interval_ms || length_delta >= self.config.min_length_delta
    }
}

/// Keeps the `limit` most recent entries of `note_id`.
///
/// Entries of other notes come first, in their original order, followed by
/// the kept entries newest first.
pub fn prune_history(
    history: Vec<HistoryEntry>,
    note_id: NoteId,
    limit: usize,
) -> Vec<HistoryEntry> {
    let (mut mine, mut other): (Vec<_>, Vec<_>) =
        history.into_iter().partition(|entry| entry.note_id == note_id);
    mine.sort_by_key(|entry| Reverse(entry.created_at));
    mine.truncate(limit);
    other.append(&mut mine);
    other
}

#[cfg(test)]
mod tests {
    use super::{prune_history, HistoryPolicy};
    use crate::config::HistoryPolicyConfig;
    use crate::model::document::StyledDocument;
    use crate::model::history::HistoryEntry;
    use crate::model::note::Note;
    use uuid::Uuid;

    fn entry_for(note: &Note, created_at: i64) -> HistoryEntry {
        HistoryEntry::capture(note, format!("hash-{created_at}"), created_at)
    }

    #[test]
    fn should_snapshot_uses_interval_or_length_delta() {
        let policy = HistoryPolicy::new(HistoryPolicyConfig::default());
        let base = Note::new(StyledDocument::plain("x".repeat(10)), 0);
        let latest = entry_for(&base, 0);

        let small = Note::with_id(base.id, StyledDocument::plain("x".repeat(59)), 0);
        let large = Note::with_id(base.id, StyledDocument::plain("x".repeat(60)), 0);
        let shrunk = Note::with_id(base.id, StyledDocument::new(), 0);

        assert!(policy.should_snapshot(None, &small, 0));
        assert!(!policy.should_snapshot(Some(&latest), &small, 599_999));
        assert!(policy.should_snapshot(Some(&latest), &small, 600_000));
        assert!(policy.should_snapshot(Some(&latest), &large, 1));
        assert!(!policy.should_snapshot(Some(&latest), &shrunk, 1));
    }

    #[test]
    fn prune_keeps_newest_and_puts_other_notes_first() {
        let mine = Note::new(StyledDocument::plain("mine"), 0);
        let theirs = Note::new(StyledDocument::plain("theirs"), 0);
        let history = vec![
            entry_for(&mine, 1),
            entry_for(&theirs, 2),
            entry_for(&mine, 3),
            entry_for(&mine, 2),
        ];

        let pruned = prune_history(history, mine.id, 2);
        let stamps: Vec<(Uuid, i64)> = pruned
            .iter()
            .map(|entry| (entry.note_id, entry.created_at))
            .collect();
        assert_eq!(stamps, vec![(theirs.id, 2), (mine.id, 3), (mine.id, 2)]);
    }
}
