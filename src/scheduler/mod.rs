//! Day-rollover scheduling.
//!
//! Keeps the displayed content in step with the calendar day: a midnight
//! timer for the exact boundary, and a date watcher that polls and reacts
//! to resume for the cases where the timer alone is unreliable.

pub mod day;
pub mod runner;
pub mod watcher;

pub use day::{Clock, DAY_MS, DayBoundary, DayKey, system_clock};
pub use runner::{CheckReason, MidnightScheduler, RolloverEvent};
pub use watcher::DateWatcher;
