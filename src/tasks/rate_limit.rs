//! Debounce and throttle wrappers for bursty callbacks
//!
//! Both wrap a callback taking one argument. Calls that are held back keep
//! only the latest argument.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::Instant;
use tracing::warn;

use super::scheduler::{run_isolated, Scheduler, TaskHandle};

type Handler<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

struct DebounceState<T> {
    generation: u64,
    timer: Option<TaskHandle>,
    queued: Option<T>,
}

/// Delays a callback until calls stop arriving for `delay`.
///
/// With `immediate`, a call arriving while idle runs at once; calls made
/// during the following quiet window collapse into one trailing run.
pub struct Debounced<T> {
    scheduler: Scheduler,
    delay: Duration,
    immediate: bool,
    callback: Handler<T>,
    state: Arc<Mutex<DebounceState<T>>>,
}

impl<T: Send + 'static> Debounced<T> {
    pub fn new<F>(scheduler: Scheduler, delay: Duration, immediate: bool, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            scheduler,
            delay,
            immediate,
            callback: Arc::new(callback),
            state: Arc::new(Mutex::new(DebounceState {
                generation: 0,
                timer: None,
                queued: None,
            })),
        }
    }

    pub fn call(&self, arg: T) {
        let Ok(mut state) = self.state.lock() else {
            warn!("Debounce state poisoned, dropping call");
            return;
        };

        let idle = state.timer.is_none();
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        state.generation += 1;
        let generation = state.generation;

        let run_now = if self.immediate && idle {
            state.queued = None;
            Some(arg)
        } else {
            state.queued = Some(arg);
            None
        };

        let shared = Arc::clone(&self.state);
        let callback = Arc::clone(&self.callback);
        state.timer = Some(self.scheduler.run_after(self.delay, move || {
            let queued = match shared.lock() {
                Ok(mut state) if state.generation == generation => {
                    state.timer = None;
                    state.queued.take()
                }
                _ => None,
            };
            if let Some(arg) = queued {
                callback(arg);
            }
        }));
        drop(state);

        if let Some(arg) = run_now {
            run_isolated(|| (self.callback)(arg));
        }
    }
}

impl<T> fmt::Debug for Debounced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("delay", &self.delay)
            .field("immediate", &self.immediate)
            .finish_non_exhaustive()
    }
}

struct ThrottleState<T> {
    generation: u64,
    last_run: Option<Instant>,
    pending: Option<TaskHandle>,
    queued: Option<T>,
}

/// Runs a callback at most once per `delay`, deferring the latest held-back
/// call to the end of the window.
pub struct Throttled<T> {
    scheduler: Scheduler,
    delay: Duration,
    callback: Handler<T>,
    state: Arc<Mutex<ThrottleState<T>>>,
}

impl<T: Send + 'static> Throttled<T> {
    pub fn new<F>(scheduler: Scheduler, delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            scheduler,
            delay,
            callback: Arc::new(callback),
            state: Arc::new(Mutex::new(ThrottleState {
                generation: 0,
                last_run: None,
                pending: None,
                queued: None,
            })),
        }
    }

    pub fn call(&self, arg: T) {
        let Ok(mut state) = self.state.lock() else {
            warn!("Throttle state poisoned, dropping call");
            return;
        };

        if let Some(pending) = state.pending.take() {
            pending.cancel();
        }
        state.generation += 1;
        let generation = state.generation;

        let now = Instant::now();
        let since_last = state.last_run.map(|last| now.duration_since(last));
        match since_last {
            Some(elapsed) if elapsed < self.delay => {
                state.queued = Some(arg);
                let shared = Arc::clone(&self.state);
                let callback = Arc::clone(&self.callback);
                state.pending = Some(self.scheduler.run_after(self.delay - elapsed, move || {
                    let queued = match shared.lock() {
                        Ok(mut state) if state.generation == generation => {
                            state.pending = None;
                            state.last_run = Some(Instant::now());
                            state.queued.take()
                        }
                        _ => None,
                    };
                    if let Some(arg) = queued {
                        callback(arg);
                    }
                }));
            }
            _ => {
                state.queued = None;
                state.last_run = Some(now);
                drop(state);
                run_isolated(|| (self.callback)(arg));
            }
        }
    }
}

impl<T> fmt::Debug for Throttled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
