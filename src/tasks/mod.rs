//! Background tasks module
//! 
//! Timer scheduling primitives, rate limiters built on them, and the tasks
//! that run alongside the HTTP server.

pub mod countdown_monitor;
pub mod rate_limit;
pub mod scheduler;

// Re-export main types
pub use countdown_monitor::countdown_monitor_task;
pub use rate_limit::{Debounced, Throttled};
pub use scheduler::{Scheduler, TaskHandle};
