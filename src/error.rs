//! Error types for the timer and scheduling layer

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("countdown duration must be at least one second")]
    ZeroDuration,
    #[error("countdown duration of {0} seconds does not fit in milliseconds")]
    DurationOverflow(u64),
    #[error("no tokio runtime available to schedule timer callbacks")]
    NoRuntime,
    #[error("timer state lock poisoned")]
    StatePoisoned,
}
