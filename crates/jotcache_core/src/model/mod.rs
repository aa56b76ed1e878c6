//! Domain model for styled notes and their history snapshots.
//!
//! # Responsibility
//! - Define the styled-text document value edited by sessions.
//! - Define persisted `Note` and `HistoryEntry` records.
//! - Define the serialized form of content and its content hash.
//!
//! # Invariants
//! - Every note and history entry is identified by a stable UUID.
//! - Records are plain values; handing one to display or history code
//!   always hands over an independent copy.

pub mod codec;
pub mod document;
pub mod history;
pub mod note;
