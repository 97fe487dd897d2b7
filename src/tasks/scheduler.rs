//! Callback scheduling on top of the tokio runtime
//!
//! Two primitives: a repeating callback and a one-shot delayed callback. Both
//! hand back a [`TaskHandle`] that deregisters the callback when cancelled.

use std::{
    ops::ControlFlow,
    panic::{catch_unwind, AssertUnwindSafe},
    time::Duration,
};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{interval_at, sleep_until, Instant, MissedTickBehavior},
};
use tracing::error;

use crate::error::TimerError;

/// Cancellable registration of a scheduled callback
#[derive(Debug)]
pub struct TaskHandle {
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Deregister the callback. Harmless if it already ran or was cancelled.
    pub fn cancel(&self) {
        self.join.abort();
    }

    /// Whether the underlying task has stopped, by completion or cancellation
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Spawns timer callbacks onto a captured tokio runtime
#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    /// Capture the runtime the caller is running on
    pub fn current() -> Result<Self, TimerError> {
        Handle::try_current()
            .map(|handle| Self { handle })
            .map_err(|_| TimerError::NoRuntime)
    }

    /// Run `callback` every `period`, first call one full period after this
    /// returns, however late the runtime first polls the task.
    ///
    /// The callback stops the stream by returning `ControlFlow::Break`.
    pub fn repeat_every<F>(&self, period: Duration, mut callback: F) -> TaskHandle
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let first = Instant::now() + period;
        let join = self.handle.spawn(async move {
            let mut ticks = interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;
                match catch_unwind(AssertUnwindSafe(&mut callback)) {
                    Ok(ControlFlow::Continue(())) => {}
                    Ok(ControlFlow::Break(())) => break,
                    Err(_) => {
                        error!("Repeating callback panicked, stopping its schedule");
                        break;
                    }
                }
            }
        });

        TaskHandle { join }
    }

    /// Run `callback` once, `delay` after this call
    pub fn run_after<F>(&self, delay: Duration, callback: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + delay;
        let join = self.handle.spawn(async move {
            sleep_until(deadline).await;
            run_isolated(callback);
        });

        TaskHandle { join }
    }
}

/// Run a caller-supplied callback so that a panic inside it is logged
/// instead of tearing down the task that owns it.
pub(crate) fn run_isolated<F: FnOnce()>(callback: F) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        error!("Scheduled callback panicked");
    }
}
