//! Debounced fan-out of "notes changed" signals to store observers.
//!
//! # Responsibility
//! - Keep the observer registry (widgets, companion caches, UI lists).
//! - Collapse bursts of note writes into one notification per quiet window.
//!
//! # Invariants
//! - Observer failures and panics are logged and never reach the writer.
//! - Observers are called on the notifier worker thread, outside the store
//!   lane, so they may read the store.

use crate::sync::debounce::Debouncer;
use log::{debug, error, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Receiver of debounced note-collection change signals.
pub trait StoreObserver: Send + Sync {
    /// Called once per quiet window after one or more note writes.
    fn notes_changed(&self) -> Result<(), String>;
}

type ObserverList = Arc<Mutex<Vec<Arc<dyn StoreObserver>>>>;

/// Observer registry plus its debouncer.
pub struct ChangeNotifier {
    observers: ObserverList,
    debouncer: Debouncer<()>,
}

impl ChangeNotifier {
    pub fn new(window: Duration) -> Self {
        let observers: ObserverList = Arc::new(Mutex::new(Vec::new()));
        let targets = Arc::clone(&observers);
        let debouncer = Debouncer::spawn("notify", window, move |()| notify_all(&targets));
        Self {
            observers,
            debouncer,
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Schedules a notification after the quiet window.
    pub fn schedule(&self) {
        self.debouncer.push(());
    }

    /// Sends a pending notification now.
    pub fn flush(&self) {
        self.debouncer.flush();
    }
}

fn notify_all(observers: &Mutex<Vec<Arc<dyn StoreObserver>>>) {
    let targets: Vec<Arc<dyn StoreObserver>> = observers
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    debug!(
        "event=notes_changed module=sync status=start observers={}",
        targets.len()
    );

    for (index, observer) in targets.iter().enumerate() {
        match catch_unwind(AssertUnwindSafe(|| observer.notes_changed())) {
            Ok(Ok(())) => {}
            Ok(Err(message)) => warn!(
                "event=notes_changed module=sync status=error observer={index} error={message}"
            ),
            Err(_) => error!(
                "event=notes_changed module=sync status=error observer={index} error_code=observer_panicked"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeNotifier, StoreObserver};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct Counter(AtomicUsize);

    impl StoreObserver for Counter {
        fn notes_changed(&self) -> Result<(), String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl StoreObserver for Failing {
        fn notes_changed(&self) -> Result<(), String> {
            Err("widget unavailable".to_string())
        }
    }

    #[test]
    fn burst_of_writes_notifies_once_and_failures_are_isolated() {
        let notifier = ChangeNotifier::new(Duration::from_secs(60));
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        notifier.subscribe(Arc::new(Failing));
        notifier.subscribe(counter.clone());

        notifier.schedule();
        notifier.schedule();
        notifier.schedule();
        notifier.flush();

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
