use jotcache_core::db::open_db_in_memory;
use jotcache_core::{
    KvRepository, RepoError, RepoResult, SharedStore, SnapshotDecision, SqliteKvRepository,
    StoreConfig, StoreObserver, StyledDocument, UpdateOutcome,
};
use rusqlite::{params, Connection};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

const NAMESPACE: &str = "test.jotcache";
const T0: i64 = 1_700_000_000_000;

fn config() -> StoreConfig {
    StoreConfig {
        namespace: NAMESPACE.to_string(),
        notify_debounce_ms: 60_000,
        ..StoreConfig::default()
    }
}

/// Key-value backend whose writes can be switched to fail.
struct FlakyKv {
    inner: SqliteKvRepository,
    fail_writes: Arc<AtomicBool>,
}

impl KvRepository for FlakyKv {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Db(jotcache_core::db::DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )));
        }
        self.inner.save(key, value)
    }
}

fn flaky_store() -> (SharedStore<FlakyKv>, Arc<AtomicBool>) {
    let fail_writes = Arc::new(AtomicBool::new(false));
    let kv = FlakyKv {
        inner: SqliteKvRepository::try_new(open_db_in_memory().unwrap(), NAMESPACE).unwrap(),
        fail_writes: Arc::clone(&fail_writes),
    };
    (SharedStore::new(kv, &config()), fail_writes)
}

/// Key-value backend whose next load panics while the lane is held.
struct PanickingKv {
    inner: SqliteKvRepository,
    panic_next_load: Arc<AtomicBool>,
}

impl KvRepository for PanickingKv {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        if self.panic_next_load.swap(false, Ordering::SeqCst) {
            panic!("simulated backend crash");
        }
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        self.inner.save(key, value)
    }
}

struct CountingObserver(AtomicUsize);

impl StoreObserver for CountingObserver {
    fn notes_changed(&self) -> Result<(), String> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn create_get_and_list_newest_first() {
    let store = SharedStore::open_in_memory(&config()).unwrap();
    let notes = store.notes();

    let first = notes.create_at(StyledDocument::plain("first"), T0);
    let second = notes.create_at(StyledDocument::plain("second"), T0 + 10);
    let third = notes.create_at(StyledDocument::plain("third"), T0 + 5);

    let listed: Vec<Uuid> = notes.list().into_iter().map(|note| note.id).collect();
    assert_eq!(listed, vec![second, third, first]);

    let fetched = notes.get(third).unwrap();
    assert_eq!(fetched.plain_text, "third");
    assert_eq!(fetched.updated_at, T0 + 5);
    assert!(notes.get(Uuid::new_v4()).is_none());
    assert!(store.history().list(first).is_empty());
}

#[test]
fn update_of_unknown_id_is_a_no_op() {
    let store = SharedStore::open_in_memory(&config()).unwrap();
    let existing = store.notes().create_at(StyledDocument::plain("keep"), T0);

    let outcome = store
        .notes()
        .update_at(Uuid::new_v4(), StyledDocument::plain("ghost"), T0 + 1);
    assert_eq!(outcome, UpdateOutcome::Missing);
    assert_eq!(outcome.note(), None);

    let notes = store.notes().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, existing);
    assert_eq!(notes[0].plain_text, "keep");
}

#[test]
fn update_replaces_content_and_never_moves_timestamp_backwards() {
    let store = SharedStore::open_in_memory(&config()).unwrap();
    let id = store.notes().create_at(StyledDocument::plain("draft"), T0);

    let outcome = store
        .notes()
        .update_at(id, StyledDocument::plain("edited"), T0 + 5_000);
    assert_eq!(outcome.note().unwrap().updated_at, T0 + 5_000);

    let outcome = store
        .notes()
        .update_at(id, StyledDocument::plain("clock skew"), T0 + 1_000);
    let note = outcome.note().unwrap();
    assert_eq!(note.plain_text, "clock skew");
    assert_eq!(note.updated_at, T0 + 5_000);
    assert_eq!(store.notes().get(id).unwrap(), *note);
}

#[test]
fn quick_small_edits_capture_only_first_snapshot() {
    let store = SharedStore::open_in_memory(&config()).unwrap();
    let id = store.notes().create_at(StyledDocument::new(), T0);

    let first = store
        .notes()
        .update_at(id, StyledDocument::plain("hello"), T0 + 100);
    assert!(matches!(
        first.snapshot(),
        Some(SnapshotDecision::Captured(_))
    ));

    let second = store
        .notes()
        .update_at(id, StyledDocument::plain("hello there"), T0 + 900);
    assert_eq!(second.snapshot(), Some(SnapshotDecision::BelowThreshold));

    let history = store.history().list(id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].plain_text, "hello");
}

#[test]
fn delete_cascades_to_own_history_only() {
    let store = SharedStore::open_in_memory(&config()).unwrap();
    let doomed = store.notes().create_at(StyledDocument::new(), T0);
    let survivor = store.notes().create_at(StyledDocument::new(), T0);
    for (offset, text) in [(1, "one"), (700_000, "two")] {
        store
            .notes()
            .update_at(doomed, StyledDocument::plain(text), T0 + offset);
        store
            .notes()
            .update_at(survivor, StyledDocument::plain(text), T0 + offset);
    }
    assert_eq!(store.history().list(doomed).len(), 2);

    assert!(store.notes().delete(doomed));
    assert!(store.notes().get(doomed).is_none());
    assert!(store.history().list(doomed).is_empty());
    assert_eq!(store.history().list(survivor).len(), 2);
    assert!(store.notes().get(survivor).is_some());

    assert!(!store.notes().delete(doomed));
}

#[test]
fn damaged_collections_read_as_empty_and_recover_on_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let store = SharedStore::open(&path, &config()).unwrap();
    store.notes().create_at(StyledDocument::plain("lost"), T0);

    let raw = Connection::open(&path).unwrap();
    raw.execute(
        "UPDATE kv_entries SET value = ?1 WHERE namespace = ?2 AND key = 'notes';",
        params![b"{broken".to_vec(), NAMESPACE],
    )
    .unwrap();

    assert!(store.notes().list().is_empty());
    let id = store.notes().create_at(StyledDocument::plain("fresh"), T0 + 1);
    let notes = store.notes().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, id);
}

#[test]
fn write_failure_keeps_previous_state_and_reports_in_memory_result() {
    let (store, fail_writes) = flaky_store();
    let id = store.notes().create_at(StyledDocument::plain("saved"), T0);

    fail_writes.store(true, Ordering::SeqCst);
    let outcome = store
        .notes()
        .update_at(id, StyledDocument::plain("unsaved"), T0 + 1);
    assert_eq!(outcome.note().unwrap().plain_text, "unsaved");
    let lost = store.notes().create_at(StyledDocument::plain("never stored"), T0 + 2);

    fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(store.notes().get(id).unwrap().plain_text, "saved");
    assert!(store.notes().get(lost).is_none());
    assert!(store.history().list(id).is_empty());
}

#[test]
fn observers_hear_one_signal_per_burst_of_successful_writes() {
    let (store, fail_writes) = flaky_store();
    let observer = Arc::new(CountingObserver(AtomicUsize::new(0)));
    store.subscribe(observer.clone());

    let id = store.notes().create_at(StyledDocument::plain("a"), T0);
    store.notes().update_at(id, StyledDocument::plain("ab"), T0 + 1);
    store.flush_notifications();
    assert_eq!(observer.0.load(Ordering::SeqCst), 1);

    fail_writes.store(true, Ordering::SeqCst);
    store.notes().update_at(id, StyledDocument::plain("abc"), T0 + 2);
    store.flush_notifications();
    assert_eq!(observer.0.load(Ordering::SeqCst), 1);
}

#[test]
fn collections_survive_reopen_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    let (notes_before, history_before, id) = {
        let store = SharedStore::open(&path, &config()).unwrap();
        let id = store.notes().create_at(StyledDocument::new(), T0);
        let mut styled = StyledDocument::plain("Heading\nbody text");
        styled.restyle_each_run(jotcache_core::TextRange::new(0, 7), |style| {
            style.resized_by(6)
        });
        store.notes().update_at(id, styled, T0 + 1);
        store
            .notes()
            .update_at(id, StyledDocument::plain("rewritten"), T0 + 700_000);
        (store.notes().list(), store.history().list(id), id)
    };

    let reopened = SharedStore::open(&path, &config()).unwrap();
    assert_eq!(reopened.notes().list(), notes_before);
    assert_eq!(reopened.history().list(id), history_before);
    assert_eq!(history_before.len(), 2);
}

#[test]
fn concurrent_updates_each_run_update_and_policy_atomically() {
    const WRITERS: usize = 25;
    let store = Arc::new(SharedStore::open_in_memory(&config()).unwrap());
    let id = store.notes().create_at(StyledDocument::new(), T0);

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                // Lengths differ pairwise by 60 chars, so every write crosses
                // the length threshold whatever order the lane runs them in.
                let text = "x".repeat(60 * (writer + 1));
                let now = T0 + 1 + writer as i64;
                store
                    .notes()
                    .update_at(id, StyledDocument::plain(text), now)
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().unwrap();
        assert!(matches!(
            outcome.snapshot(),
            Some(SnapshotDecision::Captured(_))
        ));
    }

    let retention = store.policy().config().retention_limit;
    let history = store.history().list(id);
    assert_eq!(history.len(), retention);
    assert!(history
        .windows(2)
        .all(|pair| pair[0].created_at > pair[1].created_at));

    let notes = store.notes().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].plain_text_len() % 60, 0);
}

#[test]
fn panic_inside_the_lane_does_not_disable_the_store() {
    let panic_next_load = Arc::new(AtomicBool::new(false));
    let kv = PanickingKv {
        inner: SqliteKvRepository::try_new(open_db_in_memory().unwrap(), NAMESPACE).unwrap(),
        panic_next_load: Arc::clone(&panic_next_load),
    };
    let store = SharedStore::new(kv, &config());
    let id = store.notes().create_at(StyledDocument::plain("before"), T0);

    panic_next_load.store(true, Ordering::SeqCst);
    let crashed = catch_unwind(AssertUnwindSafe(|| store.notes().list()));
    assert!(crashed.is_err());

    let notes = store.notes().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].plain_text, "before");

    let outcome = store
        .notes()
        .update_at(id, StyledDocument::plain("after"), T0 + 1);
    assert_eq!(outcome.note().unwrap().plain_text, "after");
    assert_eq!(store.notes().get(id).unwrap().plain_text, "after");
}
