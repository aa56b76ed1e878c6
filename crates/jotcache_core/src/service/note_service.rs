//! Note use-case service.
//!
//! # Responsibility
//! - Provide list/create/get/update/delete over the note collection.
//! - Run the history policy inside the same lane as every content update.
//! - Cascade note deletion to its history entries.
//!
//! # Invariants
//! - Note list is always sorted by `updated_at DESC`.
//! - Unknown ids are a no-op outcome, never an error.
//! - Write failures are logged and swallowed; the previous persisted state
//!   stays in place.

use crate::model::document::StyledDocument;
use crate::model::history::HistoryEntry;
use crate::model::note::{Note, NoteId};
use crate::repo::history_repo::HistoryRepository;
use crate::repo::kv_repo::KvRepository;
use crate::repo::note_repo::NoteRepository;
use crate::service::history_policy::{HistoryPolicy, SnapshotDecision};
use crate::service::shared_store::SharedStore;
use log::{error, info};
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of a content update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No note with the requested id exists; nothing changed.
    Missing,
    /// The note was updated; `snapshot` reports the history decision.
    Saved {
        note: Note,
        snapshot: SnapshotDecision,
    },
}

impl UpdateOutcome {
    pub fn note(&self) -> Option<&Note> {
        match self {
            Self::Missing => None,
            Self::Saved { note, .. } => Some(note),
        }
    }

    pub fn snapshot(&self) -> Option<SnapshotDecision> {
        match self {
            Self::Missing => None,
            Self::Saved { snapshot, .. } => Some(*snapshot),
        }
    }
}

/// Note service bound to one shared store.
pub struct NoteService<'s, R: KvRepository> {
    store: &'s SharedStore<R>,
}

impl<'s, R: KvRepository> NoteService<'s, R> {
    pub(crate) fn new(store: &'s SharedStore<R>) -> Self {
        Self { store }
    }

    /// All notes, most recently updated first.
    pub fn list(&self) -> Vec<Note> {
        self.store
            .with_lane(|kv| NoteRepository::new(kv).load_recent_first())
    }

    pub fn get(&self, id: NoteId) -> Option<Note> {
        self.store.with_lane(|kv| {
            NoteRepository::new(kv)
                .load_all()
                .into_iter()
                .find(|note| note.id == id)
        })
    }

    /// Creates a note stamped with the current time and returns its id.
    pub fn create(&self, content: StyledDocument) -> NoteId {
        self.create_at(content, now_epoch_ms())
    }

    /// Creates a note stamped `now`. No history snapshot is taken.
    pub fn create_at(&self, content: StyledDocument, now: i64) -> NoteId {
        let note = Note::new(content, now);
        let id = note.id;
        let written = self.store.with_lane(|kv| {
            let repo = NoteRepository::new(kv);
            let mut notes = repo.load_all();
            notes.push(note);
            persist_notes(kv, &notes, "note_create")
        });
        if written {
            info!("event=note_create module=store status=ok note_id={id}");
            self.store.notify_saved();
        }
        id
    }

    /// Replaces the content of `id` stamped with the current time.
    pub fn update(&self, id: NoteId, content: StyledDocument) -> UpdateOutcome {
        self.update_at(id, content, now_epoch_ms())
    }

    /// Replaces the content of `id` and evaluates the history policy.
    pub fn update_at(&self, id: NoteId, content: StyledDocument, now: i64) -> UpdateOutcome {
        let (outcome, written) = self
            .store
            .with_lane(|kv| update_in_lane(kv, self.store.policy(), id, content, now));
        if written {
            self.store.notify_saved();
        }
        outcome
    }

    /// Removes the note and every history entry that belongs to it.
    ///
    /// Returns `false` when no note with `id` existed.
    pub fn delete(&self, id: NoteId) -> bool {
        let (removed, written) = self.store.with_lane(|kv| {
            let repo = NoteRepository::new(kv);
            let mut notes = repo.load_all();
            let before = notes.len();
            notes.retain(|note| note.id != id);
            let removed = notes.len() != before;
            let written = removed && persist_notes(kv, &notes, "note_delete");

            let history_repo = HistoryRepository::new(kv);
            let mut history = history_repo.load_all();
            let history_before = history.len();
            history.retain(|entry| entry.note_id != id);
            let cascaded = history_before - history.len();
            if cascaded > 0 {
                persist_history(kv, &history, "note_delete");
            }
            info!(
                "event=note_delete module=store status=ok note_id={id} removed={removed} history_removed={cascaded}"
            );
            (removed, written)
        });
        if written {
            self.store.notify_saved();
        }
        removed
    }
}

/// Shared update path for edits and history restores. Must run inside the
/// store lane. Returns the outcome and whether the note write succeeded.
pub(crate) fn update_in_lane<R: KvRepository + ?Sized>(
    kv: &R,
    policy: &HistoryPolicy,
    id: NoteId,
    content: StyledDocument,
    now: i64,
) -> (UpdateOutcome, bool) {
    let repo = NoteRepository::new(kv);
    let mut notes = repo.load_all();
    let Some(index) = notes.iter().position(|note| note.id == id) else {
        info!("event=note_update module=store status=skipped reason=missing note_id={id}");
        return (UpdateOutcome::Missing, false);
    };

    let previous = notes[index].clone();
    notes[index].replace_content(content, now);
    let written = persist_notes(kv, &notes, "note_update");
    let updated = notes.swap_remove(index);

    let snapshot = policy.evaluate(kv, &previous, &updated, now);
    (
        UpdateOutcome::Saved {
            note: updated,
            snapshot,
        },
        written,
    )
}

pub(crate) fn persist_notes<R: KvRepository + ?Sized>(
    kv: &R,
    notes: &[Note],
    event: &str,
) -> bool {
    match NoteRepository::new(kv).save_all(notes) {
        Ok(()) => true,
        Err(err) => {
            error!(
                "event={event} module=store status=error error_code=notes_write_failed error={err}"
            );
            false
        }
    }
}

pub(crate) fn persist_history<R: KvRepository + ?Sized>(
    kv: &R,
    history: &[HistoryEntry],
    event: &str,
) -> bool {
    match HistoryRepository::new(kv).save_all(history) {
        Ok(()) => true,
        Err(err) => {
            error!(
                "event={event} module=store status=error error_code=history_write_failed error={err}"
            );
            false
        }
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
