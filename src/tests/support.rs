//! Shared helpers for the timer test suites

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::events::EventKind;
use crate::core::time_values::TimeValues;
use crate::core::TimerConfig;
use crate::runtime::{ManualClock, Timer};

/// A timer on a fresh manual clock at t = 0
pub fn manual_timer(config: TimerConfig) -> (Timer, ManualClock) {
    let clock = ManualClock::new();
    let timer = timer_on(&clock, config);
    (timer, clock)
}

/// A timer sharing an existing manual clock
pub fn timer_on(clock: &ManualClock, config: TimerConfig) -> Timer {
    Timer::with_runtime(config, Arc::new(clock.clone()), Arc::new(clock.clone()))
}

pub fn values(second_tenths: i64, seconds: i64, minutes: i64, hours: i64, days: i64) -> TimeValues {
    TimeValues {
        second_tenths,
        seconds,
        minutes,
        hours,
        days,
    }
}

/// Assert wrapped and total readings, each as `[tenths, s, m, h, d]`
pub fn assert_times(timer: &Timer, wrapped: [i64; 5], total: [i64; 5]) {
    let [t, s, m, h, d] = wrapped;
    assert_eq!(timer.time_values(), values(t, s, m, h, d), "wrapped values");
    let [t, s, m, h, d] = total;
    assert_eq!(timer.total_time_values(), values(t, s, m, h, d), "total values");
}

/// Counts how often an event fires on a timer
pub fn count_events(timer: &Timer, kind: EventKind) -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    let listener_counter = counter.clone();
    timer.add_event_listener(kind, move |_| {
        listener_counter.fetch_add(1, Ordering::SeqCst);
    });
    counter
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Records every event a timer raises, in order
pub fn record_all_events(timer: &Timer) -> Arc<Mutex<Vec<EventKind>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in EventKind::ALL {
        let log = log.clone();
        timer.add_event_listener(kind, move |event| log.lock().push(event.kind()));
    }
    log
}
