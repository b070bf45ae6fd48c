//! Unit arithmetic
//!
//! Conversion between a flat count of tenths of a second and the five carried
//! units (tenths, seconds, minutes, hours, days). Two views are kept for every
//! reading:
//!
//! - the *wrapped* view, where each unit stays inside `[0, base)` like a clock face
//! - the *total* view, where each unit counts everything above it as well
//!   (`total.hours = days * 24 + hours`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::TimerError;
use super::time_values::TimeValues;

pub const SECOND_TENTHS_PER_SECOND: i64 = 10;
pub const SECONDS_PER_MINUTE: i64 = 60;
pub const MINUTES_PER_HOUR: i64 = 60;
pub const HOURS_PER_DAY: i64 = 24;

/// Longest start value or target a config may carry, about 73 million years.
/// Keeps `now ± duration` well inside `i64` epoch milliseconds.
pub const MAX_DURATION_MILLIS: i64 = i64::MAX / 4;

/// One of the five units a timer tracks
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Unit {
    /// Tenths of a second
    SecondTenths,
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl Unit {
    /// All units, finest first
    pub const ALL: [Unit; 5] = [
        Unit::SecondTenths,
        Unit::Seconds,
        Unit::Minutes,
        Unit::Hours,
        Unit::Days,
    ];

    /// Length of one unit in milliseconds
    pub const fn millis(self) -> i64 {
        match self {
            Unit::SecondTenths => 100,
            Unit::Seconds => 1_000,
            Unit::Minutes => 60_000,
            Unit::Hours => 3_600_000,
            Unit::Days => 86_400_000,
        }
    }

    /// How many of this unit make one of the next coarser unit.
    ///
    /// Days have no coarser unit and are unbounded.
    pub const fn base(self) -> Option<i64> {
        match self {
            Unit::SecondTenths => Some(SECOND_TENTHS_PER_SECOND),
            Unit::Seconds => Some(SECONDS_PER_MINUTE),
            Unit::Minutes => Some(MINUTES_PER_HOUR),
            Unit::Hours => Some(HOURS_PER_DAY),
            Unit::Days => None,
        }
    }

    /// Wire name, as used in JSON configs and event names
    pub const fn as_str(self) -> &'static str {
        match self {
            Unit::SecondTenths => "secondTenths",
            Unit::Seconds => "seconds",
            Unit::Minutes => "minutes",
            Unit::Hours => "hours",
            Unit::Days => "days",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| TimerError::UnknownUnit(s.to_string()))
    }
}

/// Quotient used to turn elapsed milliseconds into unit totals.
///
/// Truncates toward zero: non-negative dividends are floored, negative ones
/// take the ceiling. A countdown that runs past zero therefore reports
/// `-0.9 s` as `0` seconds rather than `-1`.
pub fn integer_quotient(value: i64, divisor: i64) -> i64 {
    value / divisor
}

/// True modulo: always in `[0, base)`, even for negative `value`.
pub fn wrap(value: i64, base: i64) -> i64 {
    value.rem_euclid(base)
}

/// Normalize raw, possibly overflowing or negative, unit values.
///
/// Overflow is carried bottom-up into the next coarser unit; every unit but
/// days ends up in `[0, base)`. The flat tenths count of the input is
/// preserved exactly.
pub fn carry(values: &TimeValues) -> TimeValues {
    let seconds = values
        .seconds
        .saturating_add(values.second_tenths.div_euclid(SECOND_TENTHS_PER_SECOND));
    let minutes = values
        .minutes
        .saturating_add(seconds.div_euclid(SECONDS_PER_MINUTE));
    let hours = values.hours.saturating_add(minutes.div_euclid(MINUTES_PER_HOUR));
    let days = values.days.saturating_add(hours.div_euclid(HOURS_PER_DAY));

    TimeValues {
        second_tenths: wrap(values.second_tenths, SECOND_TENTHS_PER_SECOND),
        seconds: wrap(seconds, SECONDS_PER_MINUTE),
        minutes: wrap(minutes, MINUTES_PER_HOUR),
        hours: wrap(hours, HOURS_PER_DAY),
        days,
    }
}

/// Expand wrapped values into the cumulative total view, days first.
///
/// Saturates at the `i64` bounds; [`checked_flat_tenths`] tells whether a
/// value is small enough to be exact.
pub fn total_from_wrapped(wrapped: &TimeValues) -> TimeValues {
    let expand = |coarser: i64, base: i64, finer: i64| {
        coarser.saturating_mul(base).saturating_add(finer)
    };
    let days = wrapped.days;
    let hours = expand(days, HOURS_PER_DAY, wrapped.hours);
    let minutes = expand(hours, MINUTES_PER_HOUR, wrapped.minutes);
    let seconds = expand(minutes, SECONDS_PER_MINUTE, wrapped.seconds);
    let second_tenths = expand(seconds, SECOND_TENTHS_PER_SECOND, wrapped.second_tenths);

    TimeValues {
        second_tenths,
        seconds,
        minutes,
        hours,
        days,
    }
}

/// Flat tenths count of raw values, or `None` if any step overflows or the
/// duration exceeds [`MAX_DURATION_MILLIS`].
pub fn checked_flat_tenths(values: &TimeValues) -> Option<i64> {
    let expand = |coarser: i64, base: i64, finer: i64| {
        coarser.checked_mul(base)?.checked_add(finer)
    };
    let hours = expand(values.days, HOURS_PER_DAY, values.hours)?;
    let minutes = expand(hours, MINUTES_PER_HOUR, values.minutes)?;
    let seconds = expand(minutes, SECONDS_PER_MINUTE, values.seconds)?;
    let tenths = expand(seconds, SECOND_TENTHS_PER_SECOND, values.second_tenths)?;

    let millis = tenths.checked_mul(Unit::SecondTenths.millis())?;
    (millis.checked_abs()? <= MAX_DURATION_MILLIS).then_some(tenths)
}

/// Clock-face value for a unit given its total.
///
/// Days pass through. Negative totals (a countdown past zero) are mirrored so
/// the face shows the magnitude, still inside `[0, base)`.
pub fn wrapped_from_total(unit: Unit, total: i64) -> i64 {
    match unit.base() {
        None => total,
        Some(base) if total >= 0 => wrap(total, base),
        Some(base) => (base - wrap(total, base)) % base,
    }
}

/// Wrapped view of a flat tenths count, derived by repeated modulo.
pub fn wrapped_from_tenths(total_tenths: i64) -> TimeValues {
    carry(&TimeValues {
        second_tenths: total_tenths,
        ..TimeValues::default()
    })
}
