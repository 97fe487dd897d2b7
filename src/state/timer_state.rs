//! Timer state snapshot for reporting

use serde::{Deserialize, Serialize};

use crate::timer::format_remaining;

/// Point-in-time view of a countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub active: bool,
    pub remaining_ms: u64,
    /// Remaining time rounded to whole seconds, ready for display
    pub remaining_seconds: String,
}

impl TimerState {
    pub fn new(active: bool, remaining_ms: u64) -> Self {
        Self {
            active,
            remaining_ms,
            remaining_seconds: format_remaining(remaining_ms),
        }
    }

    /// Check if the countdown is ticking
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_seconds_follow_remaining_ms() {
        let state = TimerState::new(true, 2500);
        assert!(state.is_active());
        assert_eq!(state.remaining_seconds, "3");
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let json = serde_json::to_value(TimerState::new(false, 0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "active": false, "remaining_ms": 0, "remaining_seconds": "0" })
        );
    }
}
