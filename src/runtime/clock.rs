//! Cross-platform wall clock
//!
//! Uses `std::time::SystemTime` on native targets and `js_sys::Date::now()`
//! on `wasm32` targets (where `SystemTime::now()` panics with
//! "time not implemented on this platform").

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// The real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

// ── Native implementation ───────────────────────────────────────────────────

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};

        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_millis() as i64,
            // System clock set before 1970.
            Err(before) => -(before.duration().as_millis() as i64),
        }
    }
}

// ── WASM implementation ─────────────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        const JAN_2020_MS: i64 = 1_577_836_800_000;
        assert!(SystemClock.now_millis() > JAN_2020_MS);
    }

    #[test]
    fn test_system_clock_does_not_go_backwards_quickly() {
        let first = SystemClock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(SystemClock.now_millis() >= first);
    }
}
