//! Note record.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `plain_text` always mirrors `content.plain_text()`.
//! - `updated_at` never moves backwards for the same note.

use crate::model::document::StyledDocument;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = Uuid;

/// Persisted note with its styled content and cached plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: StyledDocument,
    /// Cached flattened text, used for search and length thresholds.
    pub plain_text: String,
    /// Unix epoch milliseconds of the last content update.
    pub updated_at: i64,
}

impl Note {
    /// Creates a note with a freshly generated id.
    pub fn new(content: StyledDocument, updated_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), content, updated_at)
    }

    /// Creates a note with a caller-provided id.
    pub fn with_id(id: NoteId, content: StyledDocument, updated_at: i64) -> Self {
        Self {
            id,
            plain_text: content.plain_text(),
            content,
            updated_at,
        }
    }

    /// Replaces content and plain text, stamping `now` unless that would move
    /// `updated_at` backwards.
    pub fn replace_content(&mut self, content: StyledDocument, now: i64) {
        self.plain_text = content.plain_text();
        self.content = content;
        self.updated_at = self.updated_at.max(now);
    }

    /// Plain-text length in chars.
    pub fn plain_text_len(&self) -> usize {
        self.plain_text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::Note;
    use crate::model::document::StyledDocument;

    #[test]
    fn replace_content_refreshes_plain_text_and_keeps_timestamp_monotonic() {
        let mut note = Note::new(StyledDocument::plain("draft"), 5_000);
        note.replace_content(StyledDocument::plain("final text"), 9_000);
        assert_eq!(note.plain_text, "final text");
        assert_eq!(note.updated_at, 9_000);

        note.replace_content(StyledDocument::plain("older clock"), 1_000);
        assert_eq!(note.plain_text, "older clock");
        assert_eq!(note.updated_at, 9_000);
    }
}
