//! Active editing session for one note.
//!
//! # Responsibility
//! - Own the document being edited, its selection and pending typing style.
//! - Apply formatting commands and text input in call order.
//! - Publish a [`ContentChanged`] message for every document change.
//!
//! # Invariants
//! - The session is the only owner of its document; readers get clones.
//! - A dropped event receiver never fails an edit.

use crate::editor::formatting::{self, FormatEffect, FormattingCommand};
use crate::model::document::{StyledDocument, TextRange, TextStyle};
use crate::model::note::NoteId;
use log::debug;
use std::sync::mpsc::{self, Receiver, Sender};

/// Content-changed message carrying the new document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChanged {
    pub note_id: NoteId,
    pub document: StyledDocument,
}

/// Editing state for one note.
pub struct EditingSession {
    note_id: NoteId,
    document: StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
    events: Sender<ContentChanged>,
}

impl EditingSession {
    /// Opens a session with the caret at the end of `document`.
    ///
    /// Returns the session and the receiving end of its change channel.
    pub fn open(note_id: NoteId, document: StyledDocument) -> (Self, Receiver<ContentChanged>) {
        let (events, receiver) = mpsc::channel();
        let mut session = Self {
            note_id,
            document,
            selection: TextRange::default(),
            typing_style: TextStyle::default(),
            events,
        };
        session.select(TextRange::caret(session.document.char_len()));
        (session, receiver)
    }

    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    pub fn document(&self) -> &StyledDocument {
        &self.document
    }

    /// Independent copy of the current document.
    pub fn snapshot(&self) -> StyledDocument {
        self.document.clone()
    }

    pub fn selection(&self) -> TextRange {
        self.selection
    }

    pub fn typing_style(&self) -> TextStyle {
        self.typing_style
    }

    /// Moves the selection. A caret adopts the style of the char before it.
    pub fn select(&mut self, range: TextRange) {
        self.selection = range.clamped_to(self.document.char_len());
        if self.selection.is_caret() && !self.document.is_empty() {
            let index = self.selection.start.saturating_sub(1);
            if let Some(style) = self.document.style_at(index) {
                self.typing_style = style;
            }
        }
    }

    /// Applies one formatting command to the current selection.
    pub fn apply(&mut self, command: FormattingCommand) {
        let effect = formatting::apply(command, &self.document, self.selection, self.typing_style);
        match effect {
            FormatEffect::TypingStyle(style) => {
                debug!("event=format_typing module=editor status=ok command={command:?}");
                self.typing_style = style;
            }
            FormatEffect::Document {
                document,
                selection,
            } => {
                debug!(
                    "event=format_document module=editor status=ok command={:?} chars={}",
                    command,
                    document.char_len()
                );
                self.document = document;
                self.selection = selection;
                self.publish();
            }
        }
    }

    /// Replaces the selection with `text` in the pending typing style.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() && self.selection.is_caret() {
            return;
        }
        let at = self.selection.start;
        self.document.delete(self.selection);
        self.document.insert(at, text, self.typing_style);
        self.selection = TextRange::caret(at + text.chars().count());
        self.publish();
    }

    /// Swaps in a different document (history restore) with the caret at
    /// the end. No change event is published; the caller persists directly.
    pub fn replace_document(&mut self, document: StyledDocument) {
        self.document = document;
        self.select(TextRange::caret(self.document.char_len()));
    }

    fn publish(&self) {
        let event = ContentChanged {
            note_id: self.note_id,
            document: self.document.clone(),
        };
        if self.events.send(event).is_err() {
            debug!(
                "event=content_changed module=editor status=dropped note_id={}",
                self.note_id
            );
        }
    }
}
