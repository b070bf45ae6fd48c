//! Timer errors
//!
//! Normal timer operation never fails; the no-ops (starting a running
//! timer, removing an unknown listener) return quietly. Errors only come from
//! the edges: parsing configuration and arming a scheduler.

/// Timer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The periodic tick could not be armed
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unit name not recognized
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Event name not recognized
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TimerError {
    fn from(error: std::io::Error) -> Self {
        TimerError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for TimerError {
    fn from(error: serde_json::Error) -> Self {
        TimerError::InvalidConfig(error.to_string())
    }
}
