//! Note collection stored under the `notes` key.
//!
//! # Responsibility
//! - Load and persist the full note array of one namespace.
//!
//! # Invariants
//! - Persisted order is insertion order; callers sort for display.
//! - A damaged collection reads as empty (see `repo::collection`).

use crate::model::note::Note;
use crate::repo::collection::{load_collection, save_collection};
use crate::repo::kv_repo::{KvRepository, RepoResult};
use std::cmp::Reverse;

/// Key of the note collection inside the namespace.
pub const NOTES_KEY: &str = "notes";

/// Whole-collection view of persisted notes.
pub struct NoteRepository<'kv, R: KvRepository + ?Sized> {
    kv: &'kv R,
}

impl<'kv, R: KvRepository + ?Sized> NoteRepository<'kv, R> {
    pub fn new(kv: &'kv R) -> Self {
        Self { kv }
    }

    /// All notes in persisted order.
    pub fn load_all(&self) -> Vec<Note> {
        load_collection(self.kv, NOTES_KEY)
    }

    /// All notes, most recently updated first.
    pub fn load_recent_first(&self) -> Vec<Note> {
        let mut notes = self.load_all();
        notes.sort_by_key(|note| Reverse(note.updated_at));
        notes
    }

    /// Replaces the persisted collection.
    pub fn save_all(&self, notes: &[Note]) -> RepoResult<()> {
        save_collection(self.kv, NOTES_KEY, notes)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteRepository, NOTES_KEY};
    use crate::db::open_db_in_memory;
    use crate::model::document::StyledDocument;
    use crate::model::note::Note;
    use crate::repo::kv_repo::{KvRepository, SqliteKvRepository};

    #[test]
    fn recent_first_orders_by_updated_at_descending() {
        let kv = SqliteKvRepository::try_new(open_db_in_memory().unwrap(), "ns").unwrap();
        let repo = NoteRepository::new(&kv);
        let old = Note::new(StyledDocument::plain("old"), 1_000);
        let new = Note::new(StyledDocument::plain("new"), 3_000);
        let mid = Note::new(StyledDocument::plain("mid"), 2_000);
        repo.save_all(&[old.clone(), new.clone(), mid.clone()]).unwrap();

        let texts: Vec<String> = repo
            .load_recent_first()
            .into_iter()
            .map(|note| note.plain_text)
            .collect();
        assert_eq!(texts, vec!["new", "mid", "old"]);
        assert_eq!(repo.load_all(), vec![old, new, mid]);
    }

    #[test]
    fn damaged_collection_reads_as_empty() {
        let kv = SqliteKvRepository::try_new(open_db_in_memory().unwrap(), "ns").unwrap();
        kv.save(NOTES_KEY, b"[{\"id\":").unwrap();
        assert!(NoteRepository::new(&kv).load_all().is_empty());
    }
}
