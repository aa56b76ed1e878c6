//! History snapshot record.
//!
//! Entries are immutable once captured; the only mutations on the
//! collection are insertion by the history policy and removal.

use crate::model::document::StyledDocument;
use crate::model::note::{Note, NoteId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a history entry.
pub type HistoryEntryId = Uuid;

/// Immutable snapshot of a note's content at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    /// Note the snapshot was taken from.
    pub note_id: NoteId,
    pub content: StyledDocument,
    pub plain_text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Hex SHA-256 of the serialized content.
    pub content_hash: String,
}

impl HistoryEntry {
    /// Captures the current content of `note` as a new entry.
    pub fn capture(note: &Note, content_hash: String, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            note_id: note.id,
            content: note.content.clone(),
            plain_text: note.plain_text.clone(),
            created_at,
            content_hash,
        }
    }

    /// Plain-text length in chars.
    pub fn plain_text_len(&self) -> usize {
        self.plain_text.chars().count()
    }
}
