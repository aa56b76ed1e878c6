//! Shared note store owning the key-value backend.
//!
//! # Responsibility
//! - Serialize every note/history operation through one lane.
//! - Hand out note and history service views bound to that lane.
//! - Own the change notifier that observers subscribe to.
//!
//! # Invariants
//! - All reads and writes of both collections happen while holding `lane`.
//! - A poisoned lane is recovered; a panic in one caller never disables the
//!   store for the rest of the process.
//! - One `SharedStore` value per backing namespace per process; share it by
//!   reference or `Arc`.

use crate::config::StoreConfig;
use crate::db::{open_db, open_db_in_memory};
use crate::repo::kv_repo::{KvRepository, RepoResult, SqliteKvRepository};
use crate::service::history_policy::HistoryPolicy;
use crate::service::history_service::HistoryService;
use crate::service::note_service::NoteService;
use crate::sync::notify::{ChangeNotifier, StoreObserver};
use log::info;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Single-lane store over one key-value namespace.
pub struct SharedStore<R: KvRepository> {
    lane: Mutex<R>,
    policy: HistoryPolicy,
    notifier: ChangeNotifier,
}

impl SharedStore<SqliteKvRepository> {
    /// Opens (and migrates) the SQLite file at `path`.
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> RepoResult<Self> {
        let conn = open_db(path)?;
        let kv = SqliteKvRepository::try_new(conn, config.namespace.clone())?;
        Ok(Self::new(kv, config))
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory(config: &StoreConfig) -> RepoResult<Self> {
        let conn = open_db_in_memory()?;
        let kv = SqliteKvRepository::try_new(conn, config.namespace.clone())?;
        Ok(Self::new(kv, config))
    }
}

impl<R: KvRepository> SharedStore<R> {
    /// Wraps an existing key-value backend.
    pub fn new(kv: R, config: &StoreConfig) -> Self {
        info!(
            "event=store_open module=store status=ok namespace={} retention_limit={}",
            config.namespace, config.history.retention_limit
        );
        Self {
            lane: Mutex::new(kv),
            policy: HistoryPolicy::new(config.history.clone()),
            notifier: ChangeNotifier::new(config.notify_debounce()),
        }
    }

    pub fn notes(&self) -> NoteService<'_, R> {
        NoteService::new(self)
    }

    pub fn history(&self) -> HistoryService<'_, R> {
        HistoryService::new(self)
    }

    /// Registers an observer for debounced "notes changed" signals.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.notifier.subscribe(observer);
    }

    /// Delivers a pending change notification now.
    pub fn flush_notifications(&self) {
        self.notifier.flush();
    }

    pub fn policy(&self) -> &HistoryPolicy {
        &self.policy
    }

    /// Runs `op` with exclusive access to the backend.
    pub(crate) fn with_lane<T>(&self, op: impl FnOnce(&R) -> T) -> T {
        let guard = self.lane.lock().unwrap_or_else(PoisonError::into_inner);
        op(&guard)
    }

    /// Schedules observers after a successful note-collection write.
    pub(crate) fn notify_saved(&self) {
        self.notifier.schedule();
    }
}
