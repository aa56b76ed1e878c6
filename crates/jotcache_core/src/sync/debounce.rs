//! Trailing-edge debouncer backed by one worker thread.
//!
//! # Responsibility
//! - Coalesce bursts of pushed values and deliver only the latest one after
//!   a quiet window.
//! - Offer a synchronous flush for shutdown and tests.
//!
//! # Invariants
//! - Every push restarts the quiet window (cancel-and-restart).
//! - Pending work is delivered on flush and on drop, never discarded.
//! - A panicking handler is logged and the worker keeps running.

use log::{debug, error};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Handler<T> = Box<dyn FnMut(T) + Send>;

enum Signal<T> {
    Push(T),
    Flush(Sender<()>),
    Shutdown,
}

/// Debounced delivery of values of type `T` to one handler.
pub struct Debouncer<T: Send + 'static> {
    name: String,
    window: Duration,
    handler: Arc<Mutex<Handler<T>>>,
    signals: Option<Sender<Signal<T>>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Starts the worker thread.
    ///
    /// When the thread cannot be spawned, values are delivered immediately
    /// on the pushing thread instead.
    pub fn spawn(
        name: impl Into<String>,
        window: Duration,
        handler: impl FnMut(T) + Send + 'static,
    ) -> Self {
        let name = name.into();
        let handler: Arc<Mutex<Handler<T>>> = Arc::new(Mutex::new(Box::new(handler)));
        let (signals, receiver) = mpsc::channel();

        let worker_name = name.clone();
        let worker_handler = Arc::clone(&handler);
        let spawned = thread::Builder::new()
            .name(format!("debounce-{name}"))
            .spawn(move || run_worker(&worker_name, window, receiver, &worker_handler));

        let (signals, worker) = match spawned {
            Ok(worker) => (Some(signals), Some(worker)),
            Err(err) => {
                error!(
                    "event=debounce_spawn module=sync status=error name={name} error={err}"
                );
                (None, None)
            }
        };

        Self {
            name,
            window,
            handler,
            signals,
            worker,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces the pending value and restarts the quiet window.
    pub fn push(&self, value: T) {
        let Some(signals) = &self.signals else {
            deliver(&self.name, &self.handler, value);
            return;
        };
        if let Err(mpsc::SendError(Signal::Push(value))) = signals.send(Signal::Push(value)) {
            deliver(&self.name, &self.handler, value);
        }
    }

    /// Delivers the pending value, if any, before returning.
    pub fn flush(&self) {
        let Some(signals) = &self.signals else {
            return;
        };
        let (ack, done) = mpsc::channel();
        if signals.send(Signal::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(signals) = self.signals.take() {
            let _ = signals.send(Signal::Shutdown);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(
                    "event=debounce_join module=sync status=error name={}",
                    self.name
                );
            }
        }
    }
}

fn run_worker<T>(
    name: &str,
    window: Duration,
    signals: Receiver<Signal<T>>,
    handler: &Mutex<Handler<T>>,
) {
    let mut pending: Option<T> = None;
    loop {
        let signal = if pending.is_some() {
            match signals.recv_timeout(window) {
                Ok(signal) => signal,
                Err(RecvTimeoutError::Timeout) => {
                    fire(name, handler, pending.take());
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => Signal::Shutdown,
            }
        } else {
            match signals.recv() {
                Ok(signal) => signal,
                Err(_) => Signal::Shutdown,
            }
        };

        match signal {
            Signal::Push(value) => pending = Some(value),
            Signal::Flush(ack) => {
                fire(name, handler, pending.take());
                let _ = ack.send(());
            }
            Signal::Shutdown => {
                fire(name, handler, pending.take());
                debug!("event=debounce_stop module=sync status=ok name={name}");
                return;
            }
        }
    }
}

fn fire<T>(name: &str, handler: &Mutex<Handler<T>>, pending: Option<T>) {
    if let Some(value) = pending {
        deliver(name, handler, value);
    }
}

fn deliver<T>(name: &str, handler: &Mutex<Handler<T>>, value: T) {
    let mut guard = handler.lock().unwrap_or_else(PoisonError::into_inner);
    let call = &mut *guard;
    if catch_unwind(AssertUnwindSafe(|| call(value))).is_err() {
        error!(
            "event=debounce_fire module=sync status=error name={name} error_code=handler_panicked"
        );
    }
}
