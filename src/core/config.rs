//! Timer configuration
//!
//! [`TimerConfig`] is what a caller supplies to the constructor, `start_with`
//! or (implicitly) `reset`. Every field is optional. [`TimerSettings`] is the
//! effective, normalized configuration a timer reports back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::error::TimerError;
use super::time_values::TimeValues;
use super::units::{checked_flat_tenths, Unit};
use crate::runtime::engine::Timer;

/// User hook invoked after every tick
pub type TimerCallback = Arc<dyn Fn(&Timer) + Send + Sync>;

/// Caller-supplied configuration
///
/// `None` means "use the default": precision and callback fall back to the
/// timer's previously effective values, countdown to `false`, start values to
/// zero. An absent target means no target for a count-up timer and a zero
/// target for a countdown.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerConfig {
    /// Coarsest unit that drives ticking
    pub precision: Option<Unit>,
    pub countdown: Option<bool>,
    pub start_values: Option<TimeValues>,
    pub target: Option<TimeValues>,
    #[serde(skip)]
    pub callback: Option<TimerCallback>,
}

impl TimerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a camelCase JSON object such as
    /// `{"precision": "secondTenths", "countdown": true, "startValues": {"seconds": 30}}`
    pub fn from_json(json: &str) -> Result<Self, TimerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject start values or a target too large to place on the clock.
    pub fn validate(&self) -> Result<(), TimerError> {
        let fields = [("startValues", &self.start_values), ("target", &self.target)];
        for (name, values) in fields {
            if let Some(values) = values {
                if checked_flat_tenths(values).is_none() {
                    return Err(TimerError::InvalidConfig(format!(
                        "{} exceeds the longest supported duration",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn precision(mut self, precision: Unit) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn countdown(mut self, countdown: bool) -> Self {
        self.countdown = Some(countdown);
        self
    }

    pub fn start_values(mut self, start_values: TimeValues) -> Self {
        self.start_values = Some(start_values);
        self
    }

    pub fn target(mut self, target: TimeValues) -> Self {
        self.target = Some(target);
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Timer) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for TimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerConfig")
            .field("precision", &self.precision)
            .field("countdown", &self.countdown)
            .field("start_values", &self.start_values)
            .field("target", &self.target)
            .field("callback", &self.callback.as_ref().map(|_| "Fn(&Timer)"))
            .finish()
    }
}

/// Effective configuration of a timer
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub precision: Unit,
    pub countdown: bool,
    /// Normalized target, if any
    pub target: Option<TimeValues>,
    /// Normalized start values
    pub start_values: TimeValues,
    #[serde(skip)]
    pub callback: Option<TimerCallback>,
}

impl TimerSettings {
    /// A config that reproduces these settings when started
    pub fn to_config(&self) -> TimerConfig {
        TimerConfig {
            precision: Some(self.precision),
            countdown: Some(self.countdown),
            start_values: Some(self.start_values),
            target: self.target,
            callback: self.callback.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, TimerError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            precision: Unit::Seconds,
            countdown: false,
            target: None,
            start_values: TimeValues::default(),
            callback: None,
        }
    }
}

impl fmt::Debug for TimerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerSettings")
            .field("precision", &self.precision)
            .field("countdown", &self.countdown)
            .field("target", &self.target)
            .field("start_values", &self.start_values)
            .field("callback", &self.callback.as_ref().map(|_| "Fn(&Timer)"))
            .finish()
    }
}

impl PartialEq for TimerSettings {
    fn eq(&self, other: &Self) -> bool {
        let same_callback = match (&self.callback, &other.callback) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_callback
            && self.precision == other.precision
            && self.countdown == other.countdown
            && self.target == other.target
            && self.start_values == other.start_values
    }
}
