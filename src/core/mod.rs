//! Core timer types
//!
//! Unit arithmetic, time values, configuration, events and errors. Nothing in
//! here reads a clock or schedules work; that lives in [`crate::runtime`].

pub mod config;
pub mod error;
pub mod events;
pub mod time_values;
pub mod units;

pub use config::{TimerCallback, TimerConfig, TimerSettings};
pub use error::TimerError;
pub use events::{EventHub, EventKind, ListenerId};
pub use time_values::{FormatOptions, TimeValues};
pub use units::Unit;
