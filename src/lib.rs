//! daily-line: a terminal client for a personalised quote of the day.
//!
//! The backend picks a quote, colour, drink, flower and shopping item for
//! each user's birth date and calendar day. This crate shows them, keeps
//! them current across midnight, and themes the output from the day's
//! colour.
//!
//! # Architecture
//!
//! A single controller task owns all state and reacts to events arriving on
//! async channels:
//! - **Scheduler**: a midnight timer plus a date watcher that polls and
//!   reacts to resume, both in [`scheduler`]
//! - **Theme**: brightness classification and gradient stops in [`theme`]
//! - **Session**: ticketed load results in [`session`]
//! - **Share**: share text, share links and the clipboard fallback chain
//! - **Render**: terminal output with 24-bit colour
//!
//! HTTP access lives in the `daily-api` workspace crate.

pub mod app_dirs;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod logging;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod share;
pub mod theme;

pub use config::AppConfig;
pub use controller::{Command, Controller, ControllerOptions, ScreenEvent};
pub use error::{AppError, Result};
pub use scheduler::{DayBoundary, DayKey, MidnightScheduler};
pub use session::Session;
pub use theme::{ThemeState, ThemeVars};
