//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the byte-level key-value contract the stores run on.
//! - Isolate SQLite query details from service orchestration.
//! - Map the note and history collections onto their keys.
//!
//! # Invariants
//! - Collections are read and written whole; there are no per-record rows.

pub(crate) mod collection;
pub mod history_repo;
pub mod kv_repo;
pub mod note_repo;
