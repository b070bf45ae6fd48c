//! Timer engine
//!
//! Owns the idle/running/paused state machine, the anchor timestamp, the
//! optional target, and the two views of the current reading. Every tick it
//! recomputes all five unit totals from the time elapsed since the anchor,
//! raises an "updated" event per unit that changed, runs the user callback,
//! and stops itself once the target is reached.
//!
//! Time is never accumulated tick by tick. The anchor is chosen so that
//! `now - anchor` (or `anchor - now` for a countdown) reproduces the current
//! total, which is what keeps pause/resume free of drift.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::clock::{Clock, SystemClock};
use super::thread::ThreadScheduler;
use super::{Scheduler, Tick, TickHandle};
use crate::core::config::{TimerConfig, TimerSettings};
use crate::core::error::TimerError;
use crate::core::events::{EventHub, EventKind, ListenerId};
use crate::core::time_values::TimeValues;
use crate::core::units::{
    carry, integer_quotient, total_from_wrapped, wrapped_from_total, Unit,
};

// ── Public types ────────────────────────────────────────────────────────────

/// Lifecycle state of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

/// Payload handed to every event listener
#[derive(Clone)]
pub struct TimerEvent {
    kind: EventKind,
    timer: Timer,
}

impl TimerEvent {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The timer that raised the event
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

impl fmt::Debug for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEvent").field("kind", &self.kind).finish()
    }
}

// ── Engine state ────────────────────────────────────────────────────────────

struct EngineState {
    run_state: RunState,
    settings: TimerSettings,
    /// Config replayed by `reset`
    last_config: TimerConfig,
    time: TimeValues,
    total_time: TimeValues,
    /// Epoch millis such that elapsed-since-anchor equals the current total
    anchor: i64,
    target_timestamp: i64,
    tick_handle: Option<Box<dyn TickHandle>>,
    /// Bumped every time a tick is armed; stale ticks compare unequal
    generation: u64,
}

impl EngineState {
    fn new() -> Self {
        Self {
            run_state: RunState::Idle,
            settings: TimerSettings::default(),
            last_config: TimerConfig::default(),
            time: TimeValues::default(),
            total_time: TimeValues::default(),
            anchor: 0,
            target_timestamp: 0,
            tick_handle: None,
            generation: 0,
        }
    }

    fn direction(&self) -> i64 {
        if self.settings.countdown {
            -1
        } else {
            1
        }
    }

    /// Round down to the precision's granularity
    fn round(&self, timestamp: i64) -> i64 {
        let step = self.settings.precision.millis();
        timestamp.div_euclid(step) * step
    }

    fn configure(&mut self, config: TimerConfig, now: i64) {
        let precision = config.precision.unwrap_or(self.settings.precision);
        let countdown = config.countdown.unwrap_or(false);
        let callback = config
            .callback
            .clone()
            .or_else(|| self.settings.callback.clone());
        let start_values = carry(&config.start_values.unwrap_or_default());

        self.time = start_values;
        self.total_time = total_from_wrapped(&start_values);
        self.settings = TimerSettings {
            precision,
            countdown,
            target: None,
            start_values,
            callback,
        };
        self.anchor = self.anchor_at(now);

        let target = match config.target {
            Some(target) => Some(target),
            None if countdown => Some(TimeValues::default()),
            None => None,
        };
        self.set_target(target);
        self.last_config = config;
    }

    fn anchor_at(&self, now: i64) -> i64 {
        let offset = self
            .total_time
            .second_tenths
            .saturating_mul(Unit::SecondTenths.millis() * self.direction());
        self.round(now).saturating_sub(offset)
    }

    fn set_target(&mut self, target: Option<TimeValues>) {
        match target {
            Some(raw) => {
                let target = carry(&raw);
                let total = total_from_wrapped(&target);
                let offset = total
                    .second_tenths
                    .saturating_mul(Unit::SecondTenths.millis() * self.direction());
                self.target_timestamp = self.anchor.saturating_add(offset);
                self.settings.target = Some(target);
            }
            None => {
                self.target_timestamp = 0;
                self.settings.target = None;
            }
        }
    }

    /// An all-zero target counts as no target at all.
    fn is_target_achieved(&self, now: i64) -> bool {
        match &self.settings.target {
            Some(target) if !target.is_zero() => now >= self.target_timestamp,
            _ => false,
        }
    }

    /// Recompute every unit from `now`; returns which totals changed,
    /// finest unit first.
    fn update_counters(&mut self, now: i64) -> [bool; 5] {
        let elapsed = if self.settings.countdown {
            self.anchor.saturating_sub(now)
        } else {
            now.saturating_sub(self.anchor)
        };

        Unit::ALL.map(|unit| {
            let previous = self.total_time.get(unit);
            let total = integer_quotient(elapsed, unit.millis());
            self.total_time.set(unit, total);
            self.time.set(unit, wrapped_from_total(unit, total));
            total != previous
        })
    }

    fn disarm(&mut self) {
        if let Some(mut handle) = self.tick_handle.take() {
            handle.cancel();
        }
    }

    fn reset_counters(&mut self) {
        self.time.reset();
        self.total_time.reset();
    }
}

struct Shared {
    state: Mutex<EngineState>,
    hub: EventHub<TimerEvent>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
}

// ── Timer ───────────────────────────────────────────────────────────────────

/// A configurable timer/stopwatch
///
/// `Timer` is a handle: clones share the same state, listeners and tick.
/// The engine lock is never held while listeners or the callback run, so
/// they are free to call back into the timer (for example `reset` from a
/// `targetAchieved` listener).
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use stopclock::core::{TimerConfig, Unit};
/// use stopclock::runtime::{ManualClock, Timer};
///
/// let clock = ManualClock::new();
/// let timer = Timer::with_runtime(
///     TimerConfig::new().precision(Unit::SecondTenths),
///     Arc::new(clock.clone()),
///     Arc::new(clock.clone()),
/// );
///
/// timer.start().unwrap();
/// clock.advance(3_735_000);
/// assert_eq!(timer.time_values().to_string(), "01:02:15");
/// ```
#[derive(Clone)]
pub struct Timer {
    shared: Arc<Shared>,
}

impl Timer {
    /// A timer on the system clock, ticking on its own thread
    pub fn new(config: TimerConfig) -> Self {
        Self::with_runtime(config, Arc::new(SystemClock), Arc::new(ThreadScheduler))
    }

    /// A timer on the given clock and scheduler.
    ///
    /// `config` becomes the default used by [`Timer::start`].
    pub fn with_runtime(
        config: TimerConfig,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let now = clock.now_millis();
        let mut state = EngineState::new();
        state.configure(config, now);

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                hub: EventHub::new(),
                clock,
                scheduler,
            }),
        }
    }

    /// Start with the current effective configuration, or resume if paused.
    pub fn start(&self) -> Result<(), TimerError> {
        self.start_inner(None)
    }

    /// Start with `config` merged over the current configuration.
    ///
    /// A paused timer ignores `config` and resumes where it left off. A
    /// running timer ignores the call. Start values or a target too large to
    /// place on the clock are rejected with [`TimerError::InvalidConfig`]
    /// before anything changes.
    pub fn start_with(&self, config: TimerConfig) -> Result<(), TimerError> {
        config.validate()?;
        self.start_inner(Some(config))
    }

    fn start_inner(&self, config: Option<TimerConfig>) -> Result<(), TimerError> {
        let now = self.shared.clock.now_millis();
        {
            let mut state = self.shared.state.lock();
            match state.run_state {
                RunState::Running => return Ok(()),
                RunState::Paused => {
                    state.anchor = state.anchor_at(now);
                    let target = state.settings.target;
                    state.set_target(target);
                }
                RunState::Idle => {
                    let config = config.unwrap_or_else(|| state.settings.to_config());
                    state.configure(config, now);
                }
            }

            let rounded = state.round(now);
            if state.is_target_achieved(rounded) {
                tracing::debug!("target already reached, not starting");
                return Ok(());
            }

            self.arm(&mut state)?;
            tracing::debug!(
                precision = %state.settings.precision,
                countdown = state.settings.countdown,
                "timer started"
            );
        }

        self.emit(EventKind::Started);
        Ok(())
    }

    /// Cancel the tick and keep the current reading.
    ///
    /// Works from any state. Pausing an idle timer freezes its start values,
    /// and the next `start` resumes from them instead of reconfiguring.
    pub fn pause(&self) {
        {
            let mut state = self.shared.state.lock();
            state.disarm();
            state.run_state = RunState::Paused;
            tracing::debug!(total_tenths = state.total_time.second_tenths, "timer paused");
        }

        self.emit(EventKind::Paused);
    }

    /// Cancel the tick and zero both views.
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock();
            state.disarm();
            state.reset_counters();
            state.run_state = RunState::Idle;
        }

        tracing::debug!("timer stopped");
        self.emit(EventKind::Stopped);
    }

    /// Zero the reading and start over with the last supplied configuration.
    pub fn reset(&self) -> Result<(), TimerError> {
        let now = self.shared.clock.now_millis();
        {
            let mut state = self.shared.state.lock();
            state.disarm();
            state.reset_counters();
            state.run_state = RunState::Idle;

            let config = state.last_config.clone();
            state.configure(config, now);

            let rounded = state.round(now);
            if !state.is_target_achieved(rounded) {
                self.arm(&mut state)?;
            }
        }

        tracing::debug!("timer reset");
        self.emit(EventKind::Reset);
        Ok(())
    }

    fn arm(&self, state: &mut EngineState) -> Result<(), TimerError> {
        state.generation += 1;
        let generation = state.generation;

        let weak = Arc::downgrade(&self.shared);
        let tick: Tick = Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                Timer { shared }.tick(generation);
            }
        });

        let interval = Duration::from_millis(state.settings.precision.millis() as u64);
        let handle = self
            .shared
            .scheduler
            .schedule_periodic(interval, tick)
            .map_err(|e| {
                tracing::warn!(error = %e, "could not arm timer tick");
                e
            })?;

        state.tick_handle = Some(handle);
        state.run_state = RunState::Running;
        Ok(())
    }

    fn tick(&self, generation: u64) {
        let now = self.shared.clock.now_millis();
        let (now, changed, callback) = {
            let mut state = self.shared.state.lock();
            if state.run_state != RunState::Running || state.generation != generation {
                return;
            }
            let now = state.round(now);
            let changed = state.update_counters(now);
            tracing::trace!(total_tenths = state.total_time.second_tenths, "tick");
            (now, changed, state.settings.callback.clone())
        };

        for (unit, changed) in Unit::ALL.into_iter().zip(changed) {
            if changed {
                self.emit(EventKind::updated(unit));
            }
        }

        if let Some(callback) = callback {
            callback(self);
        }

        let achieved = {
            let state = self.shared.state.lock();
            state.run_state == RunState::Running
                && state.generation == generation
                && state.is_target_achieved(now)
        };
        if achieved {
            tracing::debug!("target achieved");
            self.stop();
            self.emit(EventKind::TargetAchieved);
        }
    }

    fn emit(&self, kind: EventKind) {
        let event = TimerEvent {
            kind,
            timer: self.clone(),
        };
        self.shared.hub.publish(kind, &event);
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.run_state() == RunState::Paused
    }

    pub fn run_state(&self) -> RunState {
        self.shared.state.lock().run_state
    }

    /// Clock-face reading: every unit but days inside `[0, base)`
    pub fn time_values(&self) -> TimeValues {
        self.shared.state.lock().time
    }

    /// Cumulative reading: each unit counts everything above it too
    pub fn total_time_values(&self) -> TimeValues {
        self.shared.state.lock().total_time
    }

    /// Effective configuration
    pub fn config(&self) -> TimerSettings {
        self.shared.state.lock().settings.clone()
    }

    // ── Listeners ───────────────────────────────────────────────────────────

    /// Register a listener for `kind`
    pub fn add_event_listener<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&TimerEvent) + Send + Sync + 'static,
    {
        self.shared.hub.subscribe(kind, Arc::new(listener))
    }

    /// Remove a listener. Unknown ids are ignored and return `false`.
    pub fn remove_event_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        self.shared.hub.unsubscribe(kind, id)
    }

    /// Drop every listener of every kind
    pub fn clear_event_listeners(&self) {
        self.shared.hub.clear();
    }

    /// True if both handles drive the same timer
    pub fn ptr_eq(&self, other: &Timer) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Timer")
            .field("run_state", &state.run_state)
            .field("time", &state.time)
            .field("total_time", &state.total_time)
            .field("settings", &state.settings)
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::manual::ManualClock;

    fn manual_timer(config: TimerConfig) -> (Timer, ManualClock) {
        let clock = ManualClock::new();
        let timer = Timer::with_runtime(config, Arc::new(clock.clone()), Arc::new(clock.clone()));
        (timer, clock)
    }

    #[test]
    fn test_new_timer_is_idle_and_zero() {
        let (timer, _clock) = manual_timer(TimerConfig::new());
        assert_eq!(timer.run_state(), RunState::Idle);
        assert!(timer.time_values().is_zero());
        assert!(timer.total_time_values().is_zero());
    }

    #[test]
    fn test_default_settings() {
        let (timer, _clock) = manual_timer(TimerConfig::new());
        let settings = timer.config();
        assert_eq!(settings.precision, Unit::Seconds);
        assert!(!settings.countdown);
        assert!(settings.target.is_none());
        assert!(settings.start_values.is_zero());
    }

    #[test]
    fn test_start_and_tick() {
        let (timer, clock) = manual_timer(TimerConfig::new());
        timer.start().unwrap();
        assert!(timer.is_running());

        clock.advance(3_000);
        assert_eq!(timer.time_values().seconds, 3);
        assert_eq!(timer.total_time_values().second_tenths, 30);
    }

    #[test]
    fn test_start_values_are_normalized() {
        let (timer, _clock) = manual_timer(
            TimerConfig::new().start_values(TimeValues::new().with_seconds(7_199)),
        );
        assert_eq!(
            timer.time_values(),
            TimeValues::new().with_seconds(59).with_minutes(59).with_hours(1)
        );
        assert_eq!(timer.total_time_values().seconds, 7_199);
        assert_eq!(timer.total_time_values().minutes, 119);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let (timer, clock) = manual_timer(TimerConfig::new());
        timer.start().unwrap();
        clock.advance(2_000);
        timer
            .start_with(TimerConfig::new().start_values(TimeValues::new().with_hours(3)))
            .unwrap();
        assert_eq!(timer.time_values().seconds, 2);
        assert_eq!(timer.time_values().hours, 0);
        assert_eq!(clock.pending_tasks(), 1);
    }

    #[test]
    fn test_pause_cancels_tick() {
        let (timer, clock) = manual_timer(TimerConfig::new());
        timer.start().unwrap();
        clock.advance(5_000);
        timer.pause();

        assert!(timer.is_paused());
        assert_eq!(clock.pending_tasks(), 0);
        clock.advance(5_000);
        assert_eq!(timer.time_values().seconds, 5);
    }

    #[test]
    fn test_pause_when_idle_enters_paused() {
        let (timer, clock) = manual_timer(
            TimerConfig::new().start_values(TimeValues::new().with_seconds(10)),
        );
        let paused = Arc::new(Mutex::new(0));
        let listener_paused = paused.clone();
        timer.add_event_listener(EventKind::Paused, move |_| *listener_paused.lock() += 1);

        timer.pause();
        assert_eq!(*paused.lock(), 1);
        assert!(timer.is_paused());
        assert_eq!(clock.pending_tasks(), 0);

        // Resumes from the frozen start values rather than reconfiguring.
        timer
            .start_with(TimerConfig::new().start_values(TimeValues::new().with_hours(1)))
            .unwrap();
        clock.advance(2_000);
        assert_eq!(timer.time_values(), TimeValues::new().with_seconds(12));
    }

    #[test]
    fn test_pause_twice_emits_twice() {
        let (timer, clock) = manual_timer(TimerConfig::new());
        let paused = Arc::new(Mutex::new(0));
        let listener_paused = paused.clone();
        timer.add_event_listener(EventKind::Paused, move |_| *listener_paused.lock() += 1);

        timer.start().unwrap();
        clock.advance(3_000);
        timer.pause();
        timer.pause();
        assert_eq!(*paused.lock(), 2);
        assert!(timer.is_paused());

        timer.start().unwrap();
        clock.advance(1_000);
        assert_eq!(timer.time_values().seconds, 4);
    }

    #[test]
    fn test_dropping_last_handle_cancels_tick() {
        let (timer, clock) = manual_timer(TimerConfig::new());
        timer.start().unwrap();
        assert_eq!(clock.pending_tasks(), 1);
        drop(timer);
        assert_eq!(clock.pending_tasks(), 0);
    }

    #[test]
    fn test_event_carries_originating_timer() {
        let (timer, clock) = manual_timer(TimerConfig::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let listener_seen = seen.clone();
        let origin = timer.clone();
        timer.add_event_listener(EventKind::SecondsUpdated, move |event| {
            listener_seen
                .lock()
                .push((event.kind(), event.timer().ptr_eq(&origin)));
        });

        timer.start().unwrap();
        clock.advance(1_000);
        assert_eq!(*seen.lock(), vec![(EventKind::SecondsUpdated, true)]);
    }

    #[test]
    fn test_countdown_past_zero_mirrors_face() {
        let (timer, clock) = manual_timer(
            TimerConfig::new()
                .countdown(true)
                .start_values(TimeValues::new().with_seconds(2)),
        );
        timer.start().unwrap();
        clock.advance(7_000);

        // Implicit zero target never stops the countdown.
        assert!(timer.is_running());
        assert_eq!(timer.total_time_values().seconds, -5);
        assert_eq!(timer.time_values().seconds, 5);
    }

    #[test]
    fn test_debug_does_not_deadlock() {
        let (timer, _clock) = manual_timer(TimerConfig::new());
        let rendered = format!("{:?}", timer);
        assert!(rendered.contains("Idle"));
    }
}
