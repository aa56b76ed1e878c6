//! Read-only note queries for companion processes (widgets, launchers).
//!
//! # Responsibility
//! - Expose lightweight note entities to processes that must not write.
//! - Filter notes by case-insensitive text match and resolve id lists.
//! - Resolve a configured widget selection to a display state.
//!
//! # Invariants
//! - The SQLite connection is opened read-only; no query here writes.
//! - Results follow the store's list order (`updated_at DESC`) unless the
//!   caller supplies an explicit id order.

use crate::db::open_db_read_only;
use crate::deep_link::DeepLink;
use crate::model::note::{Note, NoteId};
use crate::repo::kv_repo::{KvRepository, RepoResult, SqliteKvRepository};
use crate::repo::note_repo::NoteRepository;
use log::debug;
use std::collections::HashMap;
use std::path::Path;

const TITLE_MAX_CHARS: usize = 64;
const EMPTY_TITLE: &str = "Empty note";

/// Lightweight note projection for pickers and widgets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteEntity {
    pub id: NoteId,
    pub text: String,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl NoteEntity {
    /// First 64 chars of the trimmed text, or "Empty note".
    pub fn display_title(&self) -> String {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return EMPTY_TITLE.to_string();
        }
        trimmed.chars().take(TITLE_MAX_CHARS).collect()
    }

    /// URL that opens this note in the editor.
    pub fn open_url(&self) -> String {
        DeepLink::OpenNote(self.id).to_url()
    }
}

impl From<Note> for NoteEntity {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            text: note.plain_text,
            updated_at: note.updated_at,
        }
    }
}

/// What a widget configured with an optional note selection shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetSelection {
    /// No note was selected in the widget configuration.
    Unselected,
    /// The selected note no longer exists.
    Missing(NoteId),
    Note(Note),
}

/// Read-only query facade over one namespace.
pub struct CompanionQuery<R: KvRepository> {
    kv: R,
}

impl CompanionQuery<SqliteKvRepository> {
    /// Opens the store file at `path` read-only.
    pub fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> RepoResult<Self> {
        let conn = open_db_read_only(path)?;
        Ok(Self::new(SqliteKvRepository::try_new(conn, namespace)?))
    }
}

impl<R: KvRepository> CompanionQuery<R> {
    pub fn new(kv: R) -> Self {
        Self { kv }
    }

    /// Notes whose plain text contains `text` (trimmed, case-insensitive).
    /// A blank query returns every note.
    pub fn search(&self, text: &str) -> Vec<NoteEntity> {
        let needle = text.trim().to_lowercase();
        let notes = self.load_notes();
        let total = notes.len();
        let matched: Vec<NoteEntity> = notes
            .into_iter()
            .filter(|note| needle.is_empty() || note.plain_text.to_lowercase().contains(&needle))
            .map(NoteEntity::from)
            .collect();
        debug!(
            "event=companion_search module=search status=ok total={} matched={}",
            total,
            matched.len()
        );
        matched
    }

    /// Entities for `ids` in request order; unknown ids are skipped.
    pub fn fetch(&self, ids: &[NoteId]) -> Vec<NoteEntity> {
        let mut by_id: HashMap<NoteId, Note> = self
            .load_notes()
            .into_iter()
            .map(|note| (note.id, note))
            .collect();
        ids.iter()
            .filter_map(|id| by_id.remove(id))
            .map(NoteEntity::from)
            .collect()
    }

    /// Every note, most recently updated first.
    pub fn suggested(&self) -> Vec<NoteEntity> {
        self.load_notes().into_iter().map(NoteEntity::from).collect()
    }

    pub fn note(&self, id: NoteId) -> Option<Note> {
        self.load_notes().into_iter().find(|note| note.id == id)
    }

    /// Resolves a widget's configured selection.
    pub fn widget_selection(&self, selected: Option<NoteId>) -> WidgetSelection {
        let Some(id) = selected else {
            return WidgetSelection::Unselected;
        };
        match self.note(id) {
            Some(note) => WidgetSelection::Note(note),
            None => WidgetSelection::Missing(id),
        }
    }

    fn load_notes(&self) -> Vec<Note> {
        NoteRepository::new(&self.kv).load_recent_first()
    }
}
