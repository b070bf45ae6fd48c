//! Timer runtime
//!
//! The engine ([`engine::Timer`]) plus the two capabilities it needs from its
//! host: a wall clock ([`Clock`]) and a way to run a callback every N
//! milliseconds until cancelled ([`Scheduler`]).
//!
//! Implementations provided:
//! - [`SystemClock`] + [`ThreadScheduler`] for native programs
//! - [`ManualClock`], a fake clock that is also a scheduler, for tests and
//!   host-driven loops
//! - `TokioScheduler` / `TokioClock` behind the `tokio` feature

pub mod clock;
pub mod engine;
pub mod manual;
pub mod thread;
#[cfg(any(feature = "tokio", test))]
pub mod tokio_scheduler;

use std::sync::Arc;
use std::time::Duration;

use crate::core::error::TimerError;

pub use clock::{Clock, SystemClock};
pub use engine::{RunState, Timer, TimerEvent};
pub use manual::ManualClock;
pub use thread::ThreadScheduler;
#[cfg(any(feature = "tokio", test))]
pub use tokio_scheduler::{TokioClock, TokioScheduler};

/// Callback run on every tick
pub type Tick = Arc<dyn Fn() + Send + Sync>;

/// Handle to a running periodic tick
///
/// Dropping the handle cancels the tick as well.
pub trait TickHandle: Send {
    /// Stop the tick. Calling it twice is harmless.
    fn cancel(&mut self);
}

/// Host capability: run `tick` every `interval` until the handle is cancelled
pub trait Scheduler: Send + Sync {
    fn schedule_periodic(
        &self,
        interval: Duration,
        tick: Tick,
    ) -> Result<Box<dyn TickHandle>, TimerError>;
}
