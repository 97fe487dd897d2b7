//! Countdown lifecycle events broadcast to subscribers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CountdownEvent {
    Started { seconds: u64 },
    /// Fired after the grace delay once the countdown reached zero
    Completed,
    /// Fired after the grace delay following a cancel
    Cancelled,
}

impl CountdownEvent {
    /// Name used for last-action tracking
    pub fn action(&self) -> &'static str {
        match self {
            Self::Started { .. } => "countdown-start",
            Self::Completed => "countdown-complete",
            Self::Cancelled => "countdown-cancel",
        }
    }
}
