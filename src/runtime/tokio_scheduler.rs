//! Tokio-backed scheduler and clock
//!
//! `TokioScheduler` spawns one `tokio::time::interval` task per tick and aborts
//! it on cancel. `TokioClock` measures time with `tokio::time::Instant`, so a
//! test runtime started with paused time drives timers deterministically.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::clock::Clock;
use super::{Scheduler, Tick, TickHandle};
use crate::core::error::TimerError;

/// Spawns ticks onto a tokio runtime
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler for the runtime this is called from
    pub fn current() -> Result<Self, TimerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| TimerError::Scheduler(e.to_string()))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_periodic(
        &self,
        interval: Duration,
        tick: Tick,
    ) -> Result<Box<dyn TickHandle>, TimerError> {
        let task = self.handle.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                tick();
            }
        });

        Ok(Box::new(TokioTickHandle { task }))
    }
}

struct TokioTickHandle {
    task: JoinHandle<()>,
}

impl TickHandle for TokioTickHandle {
    fn cancel(&mut self) {
        self.task.abort();
    }
}

impl Drop for TokioTickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wall clock derived from tokio's monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
    origin_millis: i64,
}

impl TokioClock {
    /// A clock that reads `origin_millis` right now and advances with tokio time
    pub fn starting_at(origin_millis: i64) -> Self {
        Self {
            origin: Instant::now(),
            origin_millis,
        }
    }
}

impl Clock for TokioClock {
    fn now_millis(&self) -> i64 {
        self.origin_millis + self.origin.elapsed().as_millis() as i64
    }
}
