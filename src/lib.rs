//! Stopclock - configurable timer/stopwatch engine
//!
//! Tracks elapsed (or remaining) time across tenths of a second, seconds,
//! minutes, hours and days, raises a change event per unit, pauses and
//! resumes without drift, and can stop itself at a target duration.

pub mod core;
pub mod runtime;
mod tests;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

// Re-export commonly used types
pub use crate::core::{
    EventKind, FormatOptions, TimeValues, TimerConfig, TimerError, TimerSettings, Unit,
};
pub use crate::runtime::{Clock, ManualClock, RunState, Scheduler, Timer, TimerEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
