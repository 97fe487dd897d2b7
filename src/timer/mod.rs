//! Countdown timer
//!
//! A single countdown per [`CountdownTimer`] instance, driven by the
//! [`Scheduler`](crate::tasks::Scheduler).

pub mod countdown;

pub use countdown::{format_remaining, Callback, CountdownTimer, GRACE_DELAY, TICK_PERIOD};
