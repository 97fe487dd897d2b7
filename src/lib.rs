//! Countdown Hooks - countdown timer and client introspection helpers
//! 
//! This library provides a countdown timer with a grace delay before its
//! completion callback, debounce/throttle wrappers, user-agent and viewport
//! helpers, and a small HTTP server exposing them.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::TimerError;
pub use state::AppState;
pub use tasks::Scheduler;
pub use timer::{format_remaining, CountdownTimer};
pub use utils::signals::shutdown_signal;
