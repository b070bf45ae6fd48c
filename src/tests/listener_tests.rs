//! Listener registration across several timers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::support::{count, count_events, manual_timer, record_all_events, timer_on};
use crate::core::events::EventKind;
use crate::core::TimerConfig;
use crate::runtime::{ManualClock, TimerEvent};

#[test]
fn test_remove_listener_only_affects_its_timer() {
    let clock = ManualClock::new();
    let first = timer_on(&clock, TimerConfig::new());
    let second = timer_on(&clock, TimerConfig::new());
    first.start().unwrap();
    second.start().unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let listener = {
        let calls = calls.clone();
        move |_: &TimerEvent| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    };

    let on_first = first.add_event_listener(EventKind::SecondsUpdated, listener.clone());
    clock.advance(2_000);
    assert_eq!(count(&calls), 2);

    assert!(first.remove_event_listener(EventKind::SecondsUpdated, on_first));
    clock.advance(2_000);
    assert_eq!(count(&calls), 2);

    let on_second = second.add_event_listener(EventKind::SecondsUpdated, listener.clone());
    clock.advance(1_000);
    assert_eq!(count(&calls), 3);

    let on_first = first.add_event_listener(EventKind::SecondsUpdated, listener);
    clock.advance(1_000);
    assert_eq!(count(&calls), 5);

    assert!(second.remove_event_listener(EventKind::SecondsUpdated, on_second));
    clock.advance(1_000);
    assert_eq!(count(&calls), 6);

    assert!(first.remove_event_listener(EventKind::SecondsUpdated, on_first));
    clock.advance(1_000);
    assert_eq!(count(&calls), 6);
}

#[test]
fn test_remove_unknown_listener_is_ignored() {
    let (timer, clock) = manual_timer(TimerConfig::new());
    let other = timer_on(&clock, TimerConfig::new());
    let seconds = count_events(&timer, EventKind::SecondsUpdated);

    let foreign = other.add_event_listener(EventKind::SecondsUpdated, |_| {});
    assert!(!timer.remove_event_listener(EventKind::SecondsUpdated, foreign));
    assert!(!timer.remove_event_listener(EventKind::Started, foreign));

    timer.start().unwrap();
    clock.advance(1_000);
    assert_eq!(count(&seconds), 1);
}

#[test]
fn test_listeners_run_in_registration_order() {
    let (timer, clock) = manual_timer(TimerConfig::new());
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    for index in 0..4 {
        let order = order.clone();
        timer.add_event_listener(EventKind::SecondsUpdated, move |_| order.lock().push(index));
    }

    timer.start().unwrap();
    clock.advance(1_000);
    assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
}

#[test]
fn test_same_listener_registered_twice_fires_twice() {
    let (timer, _clock) = manual_timer(TimerConfig::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let listener = {
        let calls = calls.clone();
        move |_: &TimerEvent| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    };

    let first = timer.add_event_listener(EventKind::Started, listener.clone());
    timer.add_event_listener(EventKind::Started, listener);
    timer.start().unwrap();
    assert_eq!(count(&calls), 2);

    timer.stop();
    timer.remove_event_listener(EventKind::Started, first);
    timer.start().unwrap();
    assert_eq!(count(&calls), 3);
}

#[test]
fn test_events_are_scoped_to_their_timer() {
    let clock = ManualClock::new();
    let first = timer_on(&clock, TimerConfig::new());
    let second = timer_on(&clock, TimerConfig::new());
    let first_log = record_all_events(&first);
    let second_log = record_all_events(&second);

    first.start().unwrap();
    clock.advance(1_000);
    first.pause();

    assert_eq!(
        *first_log.lock(),
        vec![
            EventKind::Started,
            EventKind::SecondTenthsUpdated,
            EventKind::SecondsUpdated,
            EventKind::Paused,
        ]
    );
    assert!(second_log.lock().is_empty());
}

#[test]
fn test_listener_can_remove_itself() {
    let (timer, clock) = manual_timer(TimerConfig::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let own_id = Arc::new(parking_lot::Mutex::new(None));

    let id = {
        let calls = calls.clone();
        let own_id = own_id.clone();
        timer.add_event_listener(EventKind::SecondsUpdated, move |event| {
            calls.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *own_id.lock() {
                event.timer().remove_event_listener(EventKind::SecondsUpdated, id);
            }
        })
    };
    *own_id.lock() = Some(id);

    timer.start().unwrap();
    clock.advance(5_000);
    assert_eq!(count(&calls), 1);
}

#[test]
fn test_clear_event_listeners_silences_only_that_timer() {
    let clock = ManualClock::new();
    let cleared = timer_on(&clock, TimerConfig::new());
    let other = timer_on(&clock, TimerConfig::new());
    let cleared_log = record_all_events(&cleared);
    let other_seconds = count_events(&other, EventKind::SecondsUpdated);
    cleared.start().unwrap();
    other.start().unwrap();
    clock.advance(1_000);
    let seen = cleared_log.lock().len();
    assert!(seen > 0);

    cleared.clear_event_listeners();
    clock.advance(2_000);
    cleared.stop();
    assert_eq!(cleared_log.lock().len(), seen);
    assert_eq!(count(&other_seconds), 3);
    assert_eq!(cleared.total_time_values().seconds, 0);

    let restarted = count_events(&cleared, EventKind::Started);
    cleared.start().unwrap();
    assert_eq!(count(&restarted), 1);
}
