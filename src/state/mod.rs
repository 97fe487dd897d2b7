//! State management module
//! 
//! This module contains the shared server state and the snapshots it reports.

pub mod app_state;
pub mod countdown_event;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown_event::CountdownEvent;
pub use timer_state::TimerState;
