//! Thread-backed scheduler
//!
//! Each scheduled tick gets its own named OS thread. Deadlines are computed
//! from the first deadline plus whole intervals, so a slow callback delays one
//! tick but does not shift the ones after it.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{Scheduler, Tick, TickHandle};
use crate::core::error::TimerError;

#[derive(Default)]
struct CancelSignal {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl CancelSignal {
    fn cancel(&self) {
        *self.cancelled.lock() = true;
        self.wake.notify_all();
    }

    /// Sleep until `deadline`. Returns `false` if cancelled first.
    fn wait_until(&self, deadline: Instant) -> bool {
        let mut cancelled = self.cancelled.lock();
        while !*cancelled {
            if self.wake.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        !*cancelled
    }
}

/// Runs each periodic tick on a dedicated thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_periodic(
        &self,
        interval: Duration,
        tick: Tick,
    ) -> Result<Box<dyn TickHandle>, TimerError> {
        let signal = Arc::new(CancelSignal::default());
        let thread_signal = signal.clone();

        thread::Builder::new()
            .name("stopclock-tick".into())
            .spawn(move || {
                let mut deadline = Instant::now() + interval;
                while thread_signal.wait_until(deadline) {
                    tick();
                    deadline += interval;
                }
                tracing::trace!("tick thread exiting");
            })?;

        Ok(Box::new(ThreadTickHandle { signal }))
    }
}

struct ThreadTickHandle {
    signal: Arc<CancelSignal>,
}

impl TickHandle for ThreadTickHandle {
    fn cancel(&mut self) {
        // The tick thread is never joined here: cancel may be called from
        // inside the tick itself.
        self.signal.cancel();
    }
}

impl Drop for ThreadTickHandle {
    fn drop(&mut self) {
        self.signal.cancel();
    }
}
