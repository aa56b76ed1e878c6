//! Editing-side logic for the active note.
//!
//! # Responsibility
//! - Compute paragraph boundaries over document text.
//! - Apply formatting commands as pure document transformations.
//! - Own the active document and publish content-changed events.
//!
//! # Invariants
//! - Commands never mutate the caller's document in place; they return a
//!   replacement value.
//! - A session applies commands strictly in call order.

pub mod formatting;
pub mod paragraph;
pub mod session;
