//! Named-event publish/subscribe
//!
//! A small synchronous hub: listeners are registered per [`EventKind`] and
//! invoked in registration order on the publishing thread. Panics raised by a
//! listener are not caught here.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::error::TimerError;
use super::units::Unit;

/// Events a timer raises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Started,
    Stopped,
    Paused,
    Reset,
    TargetAchieved,
    SecondTenthsUpdated,
    SecondsUpdated,
    MinutesUpdated,
    HoursUpdated,
    DaysUpdated,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::Started,
        EventKind::Stopped,
        EventKind::Paused,
        EventKind::Reset,
        EventKind::TargetAchieved,
        EventKind::SecondTenthsUpdated,
        EventKind::SecondsUpdated,
        EventKind::MinutesUpdated,
        EventKind::HoursUpdated,
        EventKind::DaysUpdated,
    ];

    /// The "updated" event raised when `unit` changes
    pub const fn updated(unit: Unit) -> Self {
        match unit {
            Unit::SecondTenths => EventKind::SecondTenthsUpdated,
            Unit::Seconds => EventKind::SecondsUpdated,
            Unit::Minutes => EventKind::MinutesUpdated,
            Unit::Hours => EventKind::HoursUpdated,
            Unit::Days => EventKind::DaysUpdated,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::Stopped => "stopped",
            EventKind::Paused => "paused",
            EventKind::Reset => "reset",
            EventKind::TargetAchieved => "targetAchieved",
            EventKind::SecondTenthsUpdated => "secondTenthsUpdated",
            EventKind::SecondsUpdated => "secondsUpdated",
            EventKind::MinutesUpdated => "minutesUpdated",
            EventKind::HoursUpdated => "hoursUpdated",
            EventKind::DaysUpdated => "daysUpdated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TimerError::UnknownEvent(s.to_string()))
    }
}

/// Handle identifying one listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    pub fn new() -> Self {
        ListenerId(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered event handler
pub type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Synchronous, ordered event hub
///
/// Uses `parking_lot::RwLock` so publishing from a tick thread and
/// registering from the caller's thread can interleave.
pub struct EventHub<P> {
    listeners: RwLock<HashMap<EventKind, Vec<(ListenerId, Listener<P>)>>>,
}

impl<P> EventHub<P> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a listener. The same closure may be registered several times;
    /// each registration gets its own id.
    pub fn subscribe(&self, kind: EventKind, listener: Listener<P>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners
            .write()
            .entry(kind)
            .or_default()
            .push((id, listener));
        id
    }

    /// Remove one registration. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        match listeners.get_mut(&kind) {
            Some(registered) => {
                let before = registered.len();
                registered.retain(|(registered_id, _)| *registered_id != id);
                registered.len() != before
            }
            None => false,
        }
    }

    /// Invoke every listener for `kind`, in registration order.
    ///
    /// The listener list is copied before dispatch, so listeners may
    /// subscribe or unsubscribe while being notified; changes take effect on
    /// the next publish.
    pub fn publish(&self, kind: EventKind, payload: &P) {
        let snapshot: Vec<Listener<P>> = match self.listeners.read().get(&kind) {
            Some(registered) => registered.iter().map(|(_, l)| l.clone()).collect(),
            None => return,
        };

        for listener in snapshot {
            listener(payload);
        }
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map(|l| l.len()).unwrap_or(0)
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.listeners.write().clear();
    }
}

impl<P> Default for EventHub<P> {
    fn default() -> Self {
        Self::new()
    }
}
