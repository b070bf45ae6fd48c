//! Test suite for the timer engine
//!
//! Scenario tests replay timelines on a `ManualClock`; property tests check
//! the unit arithmetic and engine invariants for arbitrary inputs; the
//! runtime tests drive the real thread and tokio schedulers.

#[cfg(test)]
mod support;
#[cfg(test)]
mod listener_tests;
