//! WASM API: `#[wasm_bindgen]` exports for driving timers from JavaScript.
//!
//! This module is only compiled when targeting `wasm32`. Browsers give us no
//! threads, so every timer in the runtime shares one [`ManualClock`] that the
//! page advances from its own animation or interval loop:
//! - `init_runtime` / `destroy_runtime` for lifecycle
//! - `poll` to advance the shared clock and fire due ticks
//! - `create_timer` .. `destroy_timer` for timer control, addressed by id
//! - `get_time_values` / `get_config` for readings
//! - `drain_events` to collect everything raised since the last drain
//!
//! All inputs and outputs are JSON strings; failures come back as
//! `{"error": "..."}`.

use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use crate::core::events::EventKind;
use crate::core::time_values::{FormatOptions, TimeValues};
use crate::core::TimerConfig;
use crate::runtime::{Clock, ManualClock, Timer};

// ── Global state ────────────────────────────────────────────────────────────

struct WasmRuntime {
    clock: ManualClock,
    timers: HashMap<String, Timer>,
    events: Arc<Mutex<Vec<EventRecord>>>,
}

thread_local! {
    static RUNTIME: RefCell<Option<WasmRuntime>> = RefCell::new(None);
}

fn with_runtime<R>(f: impl FnOnce(&mut WasmRuntime) -> R) -> Result<R, String> {
    RUNTIME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(rt) => Ok(f(rt)),
            None => Err("Runtime not initialized. Call init_runtime() first.".into()),
        }
    })
}

/// Clone a timer handle out of the runtime so it can run without the
/// runtime borrowed.
fn find_timer(id: &str) -> Result<Timer, String> {
    with_runtime(|rt| rt.timers.get(id).cloned())?
        .ok_or_else(|| format!("Unknown timer id: '{}'", id))
}

fn parse_config(config_json: &str) -> Result<Option<TimerConfig>, String> {
    if config_json.trim().is_empty() {
        return Ok(None);
    }
    TimerConfig::from_json(config_json)
        .map(Some)
        .map_err(|e| format!("Invalid config JSON: {}", e))
}

// ── Response types ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct OkResponse {
    id: String,
}

#[derive(Serialize)]
struct NowResponse {
    now: i64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadingResponse {
    time_values: TimeValues,
    total_time_values: TimeValues,
    formatted: String,
    running: bool,
    paused: bool,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    timer_id: String,
    event: EventKind,
    time_values: TimeValues,
    total_time_values: TimeValues,
}

fn json_ok(id: &str) -> String {
    serde_json::to_string(&OkResponse { id: id.into() }).unwrap_or_default()
}

fn json_err(msg: impl Into<String>) -> String {
    serde_json::to_string(&ErrorResponse { error: msg.into() }).unwrap_or_default()
}

fn respond(id: &str, result: Result<(), String>) -> String {
    match result {
        Ok(()) => json_ok(id),
        Err(e) => json_err(e),
    }
}

// ── Exported functions ──────────────────────────────────────────────────────

/// Create the runtime with its clock reading `now_ms` (e.g. `Date.now()`).
#[wasm_bindgen]
pub fn init_runtime(now_ms: f64) {
    console_error_panic_hook::set_once();

    RUNTIME.with(|cell| {
        *cell.borrow_mut() = Some(WasmRuntime {
            clock: ManualClock::starting_at(now_ms as i64),
            timers: HashMap::new(),
            events: Arc::new(Mutex::new(Vec::new())),
        });
    });
}

#[wasm_bindgen]
pub fn destroy_runtime() {
    let runtime = RUNTIME.with(|cell| cell.borrow_mut().take());
    if let Some(runtime) = runtime {
        for timer in runtime.timers.values() {
            timer.clear_event_listeners();
            timer.stop();
        }
    }
}

/// Advance the shared clock to `now_ms`, firing every tick that falls due.
/// Returns `{"now": ms}` with the clock reading afterwards. A `now_ms` in the
/// past leaves the clock where it was.
#[wasm_bindgen]
pub fn poll(now_ms: f64) -> String {
    match with_runtime(|rt| rt.clock.clone()) {
        Ok(clock) => {
            clock.advance_to(now_ms as i64);
            let response = NowResponse {
                now: clock.now_millis(),
            };
            serde_json::to_string(&response).unwrap_or_default()
        }
        Err(e) => json_err(e),
    }
}

/// Create a timer from a camelCase config (may be empty) and return its id.
#[wasm_bindgen]
pub fn create_timer(config_json: &str) -> String {
    let config = match parse_config(config_json) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => return json_err(e),
    };

    let created = with_runtime(|rt| {
        let id = Uuid::new_v4().to_string();
        let timer = Timer::with_runtime(
            config,
            Arc::new(rt.clock.clone()),
            Arc::new(rt.clock.clone()),
        );

        for kind in EventKind::ALL {
            let events = rt.events.clone();
            let timer_id = id.clone();
            timer.add_event_listener(kind, move |event| {
                let source = event.timer();
                events.lock().push(EventRecord {
                    timer_id: timer_id.clone(),
                    event: event.kind(),
                    time_values: source.time_values(),
                    total_time_values: source.total_time_values(),
                });
            });
        }

        rt.timers.insert(id.clone(), timer);
        id
    });

    match created {
        Ok(id) => json_ok(&id),
        Err(e) => json_err(e),
    }
}

/// Start or resume a timer. An empty `config_json` keeps the current config.
#[wasm_bindgen]
pub fn start_timer(id: &str, config_json: &str) -> String {
    let result = find_timer(id).and_then(|timer| {
        let started = match parse_config(config_json)? {
            Some(config) => timer.start_with(config),
            None => timer.start(),
        };
        started.map_err(|e| e.to_string())
    });
    respond(id, result)
}

#[wasm_bindgen]
pub fn pause_timer(id: &str) -> String {
    respond(id, find_timer(id).map(|timer| timer.pause()))
}

#[wasm_bindgen]
pub fn stop_timer(id: &str) -> String {
    respond(id, find_timer(id).map(|timer| timer.stop()))
}

#[wasm_bindgen]
pub fn reset_timer(id: &str) -> String {
    let result = find_timer(id).and_then(|timer| timer.reset().map_err(|e| e.to_string()));
    respond(id, result)
}

/// Stop a timer and forget it. Its `stopped` event is not queued.
#[wasm_bindgen]
pub fn destroy_timer(id: &str) -> String {
    let removed = with_runtime(|rt| rt.timers.remove(id));
    match removed {
        Ok(Some(timer)) => {
            timer.clear_event_listeners();
            timer.stop();
            json_ok(id)
        }
        Ok(None) => json_err(format!("Unknown timer id: '{}'", id)),
        Err(e) => json_err(e),
    }
}

/// Current reading. `options_json` is an optional camelCase `FormatOptions`
/// object controlling the `formatted` field.
#[wasm_bindgen]
pub fn get_time_values(id: &str, options_json: &str) -> String {
    let options = if options_json.trim().is_empty() {
        FormatOptions::default()
    } else {
        match serde_json::from_str(options_json) {
            Ok(options) => options,
            Err(e) => return json_err(format!("Invalid format options JSON: {}", e)),
        }
    };

    match find_timer(id) {
        Ok(timer) => {
            let time_values = timer.time_values();
            let response = ReadingResponse {
                time_values,
                total_time_values: timer.total_time_values(),
                formatted: time_values.to_string_with(&options),
                running: timer.is_running(),
                paused: timer.is_paused(),
            };
            serde_json::to_string(&response).unwrap_or_default()
        }
        Err(e) => json_err(e),
    }
}

/// Effective configuration of a timer
#[wasm_bindgen]
pub fn get_config(id: &str) -> String {
    match find_timer(id).and_then(|timer| timer.config().to_json().map_err(|e| e.to_string())) {
        Ok(json) => json,
        Err(e) => json_err(e),
    }
}

/// Every event raised since the previous call, oldest first.
#[wasm_bindgen]
pub fn drain_events() -> String {
    match with_runtime(|rt| std::mem::take(&mut *rt.events.lock())) {
        Ok(events) => serde_json::to_string(&events).unwrap_or_default(),
        Err(e) => json_err(e),
    }
}
