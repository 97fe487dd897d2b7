//! Main application state management

use std::{
    sync::{Arc, Mutex, Weak},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{CountdownEvent, TimerState};
use crate::{
    client::PageRoutes,
    error::TimerError,
    tasks::Scheduler,
    timer::{Callback, CountdownTimer},
};

/// Main application state that owns the shared countdown
#[derive(Debug)]
pub struct AppState {
    /// The countdown driven by the HTTP endpoints
    pub countdown: CountdownTimer,
    /// Countdown length used when a start request names none
    pub default_wait_seconds: u64,
    /// Route table used to label client location paths
    pub page_routes: PageRoutes,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for countdown lifecycle notifications
    pub event_tx: broadcast::Sender<CountdownEvent>,
}

impl AppState {
    /// Create a new AppState with an idle countdown
    pub fn new(port: u16, host: String, default_wait_seconds: u64, scheduler: Scheduler) -> Self {
        let (event_tx, _) = broadcast::channel(100);

        Self {
            countdown: CountdownTimer::new(scheduler, default_wait_seconds),
            default_wait_seconds,
            page_routes: PageRoutes::default(),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
        }
    }

    /// Start the shared countdown, falling back to the configured default length
    pub fn start_countdown(self: &Arc<Self>, seconds: Option<u64>) -> Result<TimerState, TimerError> {
        let seconds = seconds.unwrap_or(self.default_wait_seconds);
        self.countdown
            .start(seconds, Some(self.notify_later(CountdownEvent::Completed)))?;
        self.publish(CountdownEvent::Started { seconds });
        Ok(self.get_timer_state())
    }

    /// Cancel the shared countdown; subscribers hear about it after the grace delay
    pub fn cancel_countdown(self: &Arc<Self>) -> Result<TimerState, TimerError> {
        self.countdown
            .cancel(Some(self.notify_later(CountdownEvent::Cancelled)))?;
        Ok(self.get_timer_state())
    }

    /// Callback that publishes `event` if the state is still alive when it runs
    fn notify_later(self: &Arc<Self>, event: CountdownEvent) -> Callback {
        let state: Weak<Self> = Arc::downgrade(self);
        Box::new(move || {
            if let Some(state) = state.upgrade() {
                state.publish(event);
            }
        })
    }

    /// Record `event` as the last action and notify subscribers
    pub fn publish(&self, event: CountdownEvent) {
        info!("Countdown event: {:?}", event);
        self.record_action(event.action());

        // No receivers is fine; the monitor task may not be running.
        if let Err(e) = self.event_tx.send(event) {
            warn!("No subscribers for countdown event: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> TimerState {
        self.countdown.snapshot()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
