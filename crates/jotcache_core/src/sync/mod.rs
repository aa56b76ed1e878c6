//! Background coordination between the editor and the shared store.
//!
//! # Responsibility
//! - Debounce editor content changes into store updates (autosave).
//! - Debounce store writes into observer notifications.
//!
//! # Invariants
//! - Each debouncer owns exactly one worker thread; dropping it flushes.

pub mod autosave;
pub mod debounce;
pub mod notify;
