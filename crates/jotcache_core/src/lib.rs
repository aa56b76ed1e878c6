//! Core domain logic for jotcache: styled notes, formatting commands and
//! automatic version history over a shared key-value store.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod deep_link;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod sync;

pub use config::{EditorConfig, HistoryPolicyConfig, StoreConfig, DEFAULT_NAMESPACE};
pub use deep_link::DeepLink;
pub use editor::formatting::{FormatEffect, FormattingCommand, ParagraphPreset};
pub use editor::session::{ContentChanged, EditingSession};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::{FontTraits, FontWeight, StyledDocument, StyledRun, TextRange, TextStyle};
pub use model::history::{HistoryEntry, HistoryEntryId};
pub use model::note::{Note, NoteId};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use search::companion::{CompanionQuery, NoteEntity, WidgetSelection};
pub use service::history_policy::{HistoryPolicy, SnapshotDecision};
pub use service::note_service::UpdateOutcome;
pub use service::shared_store::SharedStore;
pub use sync::autosave::Autosave;
pub use sync::notify::StoreObserver;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
