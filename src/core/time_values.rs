//! Time values and their string rendering

use serde::{Deserialize, Serialize};
use std::fmt;

use super::units::Unit;

/// Five unit counts, one per [`Unit`].
///
/// A timer holds two of these: the wrapped clock-face view and the total view.
/// The same type carries start values and targets in a config, where missing
/// fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeValues {
    pub second_tenths: i64,
    pub seconds: i64,
    pub minutes: i64,
    pub hours: i64,
    pub days: i64,
}

impl TimeValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_second_tenths(mut self, second_tenths: i64) -> Self {
        self.second_tenths = second_tenths;
        self
    }

    pub fn with_seconds(mut self, seconds: i64) -> Self {
        self.seconds = seconds;
        self
    }

    pub fn with_minutes(mut self, minutes: i64) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn with_hours(mut self, hours: i64) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    /// Value for a single unit
    pub fn get(&self, unit: Unit) -> i64 {
        match unit {
            Unit::SecondTenths => self.second_tenths,
            Unit::Seconds => self.seconds,
            Unit::Minutes => self.minutes,
            Unit::Hours => self.hours,
            Unit::Days => self.days,
        }
    }

    pub fn set(&mut self, unit: Unit, value: i64) {
        match unit {
            Unit::SecondTenths => self.second_tenths = value,
            Unit::Seconds => self.seconds = value,
            Unit::Minutes => self.minutes = value,
            Unit::Hours => self.hours = value,
            Unit::Days => self.days = value,
        }
    }

    /// True when every unit is zero
    pub fn is_zero(&self) -> bool {
        Unit::ALL.iter().all(|unit| self.get(*unit) == 0)
    }

    /// Set all five units back to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Render the requested units joined by a separator.
    ///
    /// Tenths are never padded. Other units are left-padded with zeros to the
    /// requested width; a value already at least that wide is shown in full,
    /// so 205 days still render as `205` with a width of 2.
    ///
    /// # Examples
    /// ```
    /// use stopclock::core::time_values::{FormatOptions, TimeValues};
    ///
    /// let values = TimeValues::new().with_hours(1).with_minutes(2).with_seconds(15);
    /// assert_eq!(values.to_string(), "01:02:15");
    ///
    /// let options = FormatOptions { left_zero_padding: 4, ..Default::default() };
    /// assert_eq!(values.to_string_with(&options), "0001:0002:0015");
    /// ```
    pub fn to_string_with(&self, options: &FormatOptions) -> String {
        options
            .units
            .iter()
            .map(|unit| match unit {
                Unit::SecondTenths => self.second_tenths.to_string(),
                _ => left_pad(self.get(*unit), options.left_zero_padding),
            })
            .collect::<Vec<_>>()
            .join(&options.separator)
    }
}

impl fmt::Display for TimeValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&FormatOptions::default()))
    }
}

fn left_pad(value: i64, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

/// Options for [`TimeValues::to_string_with`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    /// Units to render, in order
    pub units: Vec<Unit>,
    pub separator: String,
    /// Minimum width of every unit except tenths
    pub left_zero_padding: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            units: vec![Unit::Hours, Unit::Minutes, Unit::Seconds],
            separator: ":".to_string(),
            left_zero_padding: 2,
        }
    }
}
