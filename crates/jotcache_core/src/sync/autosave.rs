//! Debounced persistence of editor content changes.
//!
//! # Responsibility
//! - Turn bursts of `ContentChanged` messages into one store update per quiet
//!   window.
//!
//! # Invariants
//! - Only the latest document of a burst is written.
//! - Switching to another note writes the previous note's pending content
//!   first.
//! - Pending content is written on flush and on drop.

use crate::config::EditorConfig;
use crate::editor::session::ContentChanged;
use crate::model::note::NoteId;
use crate::repo::kv_repo::KvRepository;
use crate::service::note_service::UpdateOutcome;
use crate::service::shared_store::SharedStore;
use crate::sync::debounce::Debouncer;
use log::{debug, warn};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};

/// Autosave worker bound to one shared store.
pub struct Autosave {
    debouncer: Debouncer<ContentChanged>,
    last_note: Mutex<Option<NoteId>>,
}

impl Autosave {
    pub fn spawn<R>(store: Arc<SharedStore<R>>, config: &EditorConfig) -> Self
    where
        R: KvRepository + Send + 'static,
    {
        let debouncer = Debouncer::spawn(
            "autosave",
            config.autosave_debounce(),
            move |change: ContentChanged| {
                match store.notes().update(change.note_id, change.document) {
                    UpdateOutcome::Missing => warn!(
                        "event=autosave module=sync status=skipped reason=missing note_id={}",
                        change.note_id
                    ),
                    UpdateOutcome::Saved { snapshot, .. } => debug!(
                        "event=autosave module=sync status=ok note_id={} snapshot={:?}",
                        change.note_id, snapshot
                    ),
                }
            },
        );
        Self {
            debouncer,
            last_note: Mutex::new(None),
        }
    }

    /// Queues one change; it is written after the quiet window.
    pub fn push(&self, change: ContentChanged) {
        let previous = self
            .last_note
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(change.note_id);
        if previous.is_some_and(|id| id != change.note_id) {
            self.debouncer.flush();
        }
        self.debouncer.push(change);
    }

    /// Queues every message currently waiting on `events`.
    pub fn drain(&self, events: &Receiver<ContentChanged>) {
        for change in events.try_iter() {
            self.push(change);
        }
    }

    /// Writes pending content now.
    pub fn flush(&self) {
        self.debouncer.flush();
    }
}
