//! Manually advanced clock
//!
//! [`ManualClock`] is both a [`Clock`] and a [`Scheduler`]. Time only moves
//! when [`ManualClock::advance`] or [`ManualClock::advance_to`] is called, and
//! every periodic task that falls due on the way is run with the clock set to
//! its exact due time. Tests use it to replay hours of timer activity in
//! microseconds; the wasm binding uses it so the browser can drive ticks from
//! its own frame loop.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

use super::clock::Clock;
use super::{Scheduler, Tick, TickHandle};
use crate::core::error::TimerError;

struct Task {
    id: u64,
    interval: i64,
    next_due: i64,
    tick: Tick,
}

struct State {
    now: i64,
    next_id: u64,
    tasks: Vec<Task>,
}

/// Fake clock and scheduler; clones share the same time and tasks
#[derive(Clone)]
pub struct ManualClock {
    state: Arc<Mutex<State>>,
}

impl ManualClock {
    /// A clock at the Unix epoch
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(now_millis: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                now: now_millis,
                next_id: 0,
                tasks: Vec::new(),
            })),
        }
    }

    /// Move time forward by `millis`, running every task that falls due.
    pub fn advance(&self, millis: u64) {
        let target = self.state.lock().now + millis as i64;
        self.advance_to(target);
    }

    /// Move time forward to `target`, running every task that falls due.
    ///
    /// Tasks run in due order (ties in scheduling order) with the lock
    /// released, so a task may cancel itself or schedule new tasks. A target
    /// in the past does nothing.
    pub fn advance_to(&self, target: i64) {
        loop {
            let tick = {
                let mut state = self.state.lock();
                let due = state
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| task.next_due <= target)
                    .min_by_key(|(_, task)| (task.next_due, task.id))
                    .map(|(index, _)| index);

                match due {
                    Some(index) => {
                        let task = &mut state.tasks[index];
                        let fired_at = task.next_due;
                        task.next_due += task.interval;
                        let tick = task.tick.clone();
                        state.now = state.now.max(fired_at);
                        tick
                    }
                    None => {
                        state.now = state.now.max(target);
                        return;
                    }
                }
            };

            tick();
        }
    }

    /// Number of live periodic tasks
    pub fn pending_tasks(&self) -> usize {
        self.state.lock().tasks.len()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.state.lock().now
    }
}

impl Scheduler for ManualClock {
    fn schedule_periodic(
        &self,
        interval: Duration,
        tick: Tick,
    ) -> Result<Box<dyn TickHandle>, TimerError> {
        let interval = (interval.as_millis() as i64).max(1);
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let next_due = state.now + interval;
        state.tasks.push(Task {
            id,
            interval,
            next_due,
            tick,
        });

        Ok(Box::new(ManualTickHandle {
            id,
            state: Arc::downgrade(&self.state),
        }))
    }
}

struct ManualTickHandle {
    id: u64,
    state: Weak<Mutex<State>>,
}

impl TickHandle for ManualTickHandle {
    fn cancel(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.lock().tasks.retain(|task| task.id != self.id);
        }
    }
}

impl Drop for ManualTickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
