//! Countdown monitor background task

use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use super::{rate_limit::Throttled, Scheduler};
use crate::{state::AppState, timer::format_remaining};

/// How often remaining-time updates reach the log while a countdown runs
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Background task that logs countdown events and throttled progress.
///
/// Returns once the state is dropped and its event channel closes.
pub async fn countdown_monitor_task(state: Arc<AppState>, scheduler: Scheduler) {
    info!("Starting countdown monitor task");

    let mut event_rx = state.event_tx.subscribe();
    let mut remaining_rx = state.countdown.subscribe();
    // Only the receivers are kept, so the channels close with the state.
    drop(state);
    let progress = Throttled::new(scheduler, PROGRESS_LOG_INTERVAL, |remaining_ms: u64| {
        debug!("Countdown progress: {}s remaining", format_remaining(remaining_ms));
    });

    loop {
        tokio::select! {
            changed = remaining_rx.changed() => {
                if changed.is_err() {
                    warn!("Countdown channel closed, stopping monitor");
                    break;
                }
                let remaining_ms = *remaining_rx.borrow_and_update();
                progress.call(remaining_ms);
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => info!("Countdown {}", event.action()),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Countdown monitor lagged, skipped {} events", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        warn!("Countdown event channel closed, stopping monitor");
                        break;
                    }
                }
            }
        }
    }
}
