//! Read-side query entry points.
//!
//! # Responsibility
//! - Serve note lookups to companion processes over a read-only connection.

pub mod companion;
