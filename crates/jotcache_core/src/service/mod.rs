//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the single-lane locking discipline out of callers' hands.

pub mod history_policy;
pub mod history_service;
pub mod note_service;
pub mod shared_store;
