//! Countdown timer with a grace delay before completion callbacks

use std::{
    ops::ControlFlow,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::{
    error::TimerError,
    state::TimerState,
    tasks::scheduler::{Scheduler, TaskHandle},
};

/// Interval between two decrements of the remaining time
pub const TICK_PERIOD: Duration = Duration::from_millis(1000);
/// Pause between reaching zero (or cancelling) and running the callback
pub const GRACE_DELAY: Duration = Duration::from_millis(800);

const TICK_MS: u64 = 1000;

/// Caller-supplied completion or cancellation callback
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Registrations owned by one timer
#[derive(Debug, Default)]
struct Registrations {
    /// Bumped by every start and cancel; ticks from an older generation are ignored
    generation: u64,
    tick: Option<TaskHandle>,
    grace: Vec<TaskHandle>,
}

impl Registrations {
    fn disarm_tick(&mut self) {
        if let Some(tick) = self.tick.take() {
            tick.cancel();
        }
    }

    fn prune_grace(&mut self) {
        self.grace.retain(|handle| !handle.is_finished());
    }
}

/// Counts down from a whole number of seconds, publishing the remaining
/// milliseconds once per second.
///
/// Cloning yields another handle to the same countdown.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    scheduler: Scheduler,
    registrations: Arc<Mutex<Registrations>>,
    remaining_tx: Arc<watch::Sender<u64>>,
}

impl CountdownTimer {
    /// Create an idle timer showing `default_wait_seconds` as its remaining time
    pub fn new(scheduler: Scheduler, default_wait_seconds: u64) -> Self {
        let (remaining_tx, _) = watch::channel(default_wait_seconds.saturating_mul(TICK_MS));

        Self {
            scheduler,
            registrations: Arc::new(Mutex::new(Registrations::default())),
            remaining_tx: Arc::new(remaining_tx),
        }
    }

    /// Start counting down from `seconds`, superseding any running countdown.
    ///
    /// The remaining time is set before this returns. Once it reaches zero the
    /// tick stream stops and `on_complete` runs after [`GRACE_DELAY`].
    /// Grace callbacks still pending from earlier countdowns or cancels are dropped.
    pub fn start(&self, seconds: u64, on_complete: Option<Callback>) -> Result<(), TimerError> {
        if seconds == 0 {
            return Err(TimerError::ZeroDuration);
        }
        let total_ms = seconds
            .checked_mul(TICK_MS)
            .ok_or(TimerError::DurationOverflow(seconds))?;

        let mut registrations = self.lock()?;
        registrations.disarm_tick();
        for pending in registrations.grace.drain(..) {
            pending.cancel();
        }
        registrations.generation += 1;
        let generation = registrations.generation;

        self.remaining_tx.send_replace(total_ms);
        info!("Countdown started for {}s", seconds);

        let tick = self.scheduler.repeat_every(TICK_PERIOD, {
            let timer = self.clone();
            let mut on_complete = on_complete;
            move || timer.tick(generation, &mut on_complete)
        });
        registrations.tick = Some(tick);

        Ok(())
    }

    /// Stop the running countdown, if any, and run `on_cancelled` after
    /// [`GRACE_DELAY`]. The remaining time keeps its last published value.
    pub fn cancel(&self, on_cancelled: Option<Callback>) -> Result<(), TimerError> {
        let mut registrations = self.lock()?;
        if registrations.tick.is_some() {
            info!("Countdown cancelled at {}ms", self.remaining_ms());
        } else {
            debug!("Cancel requested with no running countdown");
        }
        registrations.disarm_tick();
        registrations.generation += 1;

        if let Some(callback) = on_cancelled {
            registrations.prune_grace();
            let handle = self.scheduler.run_after(GRACE_DELAY, callback);
            registrations.grace.push(handle);
        }

        Ok(())
    }

    /// Remaining time of the current (or last) countdown in milliseconds
    pub fn remaining_ms(&self) -> u64 {
        *self.remaining_tx.borrow()
    }

    /// Receiver notified every time the remaining time is published
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining_tx.subscribe()
    }

    /// Whether a tick stream is currently live
    pub fn is_active(&self) -> bool {
        self.lock().map(|r| r.tick.is_some()).unwrap_or(false)
    }

    pub fn snapshot(&self) -> TimerState {
        TimerState::new(self.is_active(), self.remaining_ms())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Registrations>, TimerError> {
        self.registrations
            .lock()
            .map_err(|_| TimerError::StatePoisoned)
    }

    fn tick(&self, generation: u64, on_complete: &mut Option<Callback>) -> ControlFlow<()> {
        let mut registrations = match self.lock() {
            Ok(registrations) => registrations,
            Err(e) => {
                error!("Countdown tick aborted: {}", e);
                return ControlFlow::Break(());
            }
        };
        if registrations.generation != generation {
            return ControlFlow::Break(());
        }

        let mut finished = false;
        self.remaining_tx.send_modify(|remaining| {
            *remaining = remaining.saturating_sub(TICK_MS);
            finished = *remaining == 0;
        });

        if !finished {
            debug!("Countdown tick, {}ms remaining", self.remaining_ms());
            return ControlFlow::Continue(());
        }

        info!("Countdown reached zero");
        // Detach rather than abort: this is the task currently running.
        registrations.tick = None;
        if let Some(callback) = on_complete.take() {
            registrations.prune_grace();
            let handle = self.scheduler.run_after(GRACE_DELAY, callback);
            registrations.grace.push(handle);
        }

        ControlFlow::Break(())
    }
}

/// Whole seconds in `milliseconds`, rounded half away from zero
pub fn format_remaining(milliseconds: u64) -> String {
    let seconds = milliseconds / TICK_MS + u64::from(milliseconds % TICK_MS >= TICK_MS / 2);
    seconds.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{advance, sleep, Instant};

    fn counting_callback(counter: &Arc<AtomicUsize>) -> Option<Callback> {
        let counter = Arc::clone(counter);
        Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn timer() -> CountdownTimer {
        CountdownTimer::new(Scheduler::current().unwrap(), 5)
    }

    #[tokio::test(start_paused = true)]
    async fn initial_remaining_comes_from_default() {
        assert_eq!(timer().remaining_ms(), 5000);
        assert!(!timer().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn start_sets_remaining_synchronously() {
        let timer = timer();
        for seconds in [1, 7, 60] {
            timer.start(seconds, None).unwrap();
            assert_eq!(timer.remaining_ms(), seconds * 1000);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_fires_once_after_grace() {
        let timer = timer();
        let fired = Arc::new(AtomicUsize::new(0));
        let origin = Instant::now();

        timer.start(3, counting_callback(&fired)).unwrap();
        assert!(timer.is_active());

        let mut observed = vec![timer.remaining_ms()];
        for checkpoint in [1500, 2500, 3500] {
            sleep(Duration::from_millis(checkpoint) - origin.elapsed()).await;
            observed.push(timer.remaining_ms());
        }
        assert_eq!(observed, vec![3000, 2000, 1000, 0]);
        assert!(!timer.is_active());
        assert_eq!(fired.load(Ordering::SeqCst), 0, "callback fired before grace delay");

        sleep(Duration::from_millis(3900) - origin.elapsed()).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(4900) - origin.elapsed()).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining_ms(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_timed_from_start_call() {
        let timer = timer();
        timer.start(2, None).unwrap();
        // Hold the thread before the tick task gets its first poll.
        advance(Duration::from_millis(500)).await;

        sleep(Duration::from_millis(600)).await;
        assert_eq!(timer.remaining_ms(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_completion_leaves_timer_usable() {
        let timer = timer();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.start(1, Some(Box::new(|| panic!("completion failed")))).unwrap();
        sleep(Duration::from_millis(2000)).await;
        assert_eq!(timer.remaining_ms(), 0);

        timer.start(1, counting_callback(&fired)).unwrap();
        assert!(timer.is_active());
        sleep(Duration::from_millis(2000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining_ms(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_is_never_negative_and_never_increases() {
        let timer = timer();
        let mut rx = timer.subscribe();
        timer.start(2, None).unwrap();

        let mut last = *rx.borrow_and_update();
        let deadline = Instant::now() + Duration::from_secs(5);
        while let Ok(Ok(())) = tokio::time::timeout_at(deadline, rx.changed()).await {
            let current = *rx.borrow_and_update();
            assert!(current <= last, "remaining went from {} to {}", last, current);
            last = current;
        }
        assert_eq!(last, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_previous_countdown() {
        let timer = timer();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        timer.start(2, counting_callback(&first)).unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.remaining_ms(), 1000);

        timer.start(3, counting_callback(&second)).unwrap();
        assert_eq!(timer.remaining_ms(), 3000);

        sleep(Duration::from_millis(1200)).await;
        assert_eq!(timer.remaining_ms(), 2000, "two tick streams are running");

        sleep(Duration::from_secs(5)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_during_grace_drops_stale_completion() {
        let timer = timer();
        let first = Arc::new(AtomicUsize::new(0));

        timer.start(1, counting_callback(&first)).unwrap();
        sleep(Duration::from_millis(1400)).await;
        assert_eq!(timer.remaining_ms(), 0);

        timer.start(5, None).unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_without_countdown_still_notifies() {
        let timer = timer();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.cancel(counting_callback(&fired)).unwrap();
        assert_eq!(timer.remaining_ms(), 5000);

        sleep(Duration::from_millis(700)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining_ms(), 5000);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks_and_keeps_last_value() {
        let timer = timer();
        let completed = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));

        timer.start(4, counting_callback(&completed)).unwrap();
        sleep(Duration::from_millis(1500)).await;
        timer.cancel(counting_callback(&cancelled)).unwrap();
        assert!(!timer.is_active());

        sleep(Duration::from_secs(6)).await;
        assert_eq!(timer.remaining_ms(), 3000);
        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_cancels_each_notify() {
        let timer = timer();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.cancel(counting_callback(&fired)).unwrap();
        timer.cancel(counting_callback(&fired)).unwrap();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_invalid_durations() {
        let timer = timer();
        assert_eq!(timer.start(0, None), Err(TimerError::ZeroDuration));
        assert_eq!(
            timer.start(u64::MAX, None),
            Err(TimerError::DurationOverflow(u64::MAX))
        );
        assert_eq!(timer.remaining_ms(), 5000);
        assert!(!timer.is_active());
    }

    #[test]
    fn formats_to_nearest_second() {
        assert_eq!(format_remaining(2500), "3");
        assert_eq!(format_remaining(1499), "1");
        assert_eq!(format_remaining(0), "0");
        assert_eq!(format_remaining(3000), "3");
        assert_eq!(format_remaining(u64::MAX), (u64::MAX / 1000 + 1).to_string());
    }
}
