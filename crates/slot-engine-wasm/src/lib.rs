//! WASM bindings for slot-engine.
//!
//! Exposes date eligibility, start-time and end-time queries to the booking
//! portal via `wasm-bindgen`. Rules and results cross the boundary as JSON
//! strings in the reservation API's shape. Invalid rules are dropped before
//! every query, so the rule indices in results refer to the valid rules only.
//!
//! A missing date or start time (`null`/`undefined` from JavaScript) yields an
//! empty result rather than an error.
//!
//! Functions that take rules also take the portal's IANA timezone. When it is
//! given, rule dates sent as UTC timestamps are read as portal-local dates;
//! when it is `null`, dates are taken as written.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir portal/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use slot_engine::calendar::{self, CalendarView};
use slot_engine::clock;
use slot_engine::policy::StartTimesSummary;
use slot_engine::rule::{self, AvailabilityRule};
use slot_engine::DayStatus;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DayStatusDto {
    date: NaiveDate,
    status: DayStatus,
    class_name: &'static str,
}

impl From<(NaiveDate, DayStatus)> for DayStatusDto {
    fn from((date, status): (NaiveDate, DayStatus)) -> Self {
        Self {
            date,
            status,
            class_name: status.css_class(),
        }
    }
}

#[derive(Serialize)]
struct DateRangeDto {
    min_date: NaiveDate,
    max_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_rules(json: &str, timezone: Option<String>) -> Result<Vec<AvailabilityRule>, JsValue> {
    let rules = match timezone {
        Some(name) => rule::rules_from_json_in(json, clock::parse_timezone(&name).map_err(js_err)?),
        None => rule::rules_from_json(json),
    };
    rules.map(rule::retain_valid).map_err(js_err)
}

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    rule::parse_date(s).map_err(js_err)
}

/// Parse the portal's local "now", e.g. "2026-03-16T09:30" or "2026-03-16T09:30:15".
fn parse_now(s: &str) -> Result<NaiveDateTime, JsValue> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Status of a single date: `"blocked"`, `"disabled"` or `"enabled"`.
#[wasm_bindgen(js_name = "dayStatus")]
pub fn day_status(
    rules_json: &str,
    date: &str,
    now: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let rules = parse_rules(rules_json, timezone)?;
    let status = slot_engine::day_status(&rules, parse_date(date)?, parse_now(now)?);
    Ok(status.as_str().to_string())
}

/// Statuses for every date in `[from, to]` as a JSON array of
/// `{date, status, class_name}` objects.
#[wasm_bindgen(js_name = "dayStatuses")]
pub fn day_statuses(
    rules_json: &str,
    from: &str,
    to: &str,
    now: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let rules = parse_rules(rules_json, timezone)?;
    let statuses = slot_engine::day_statuses(&rules, parse_date(from)?, parse_date(to)?, parse_now(now)?);
    let dtos: Vec<DayStatusDto> = statuses.into_iter().map(DayStatusDto::from).collect();
    to_json(&dtos)
}

/// Ordered start times for `date` as `{date, slots, default_start, default_end}`.
/// With no date chosen yet, the same shape with `date: null` and no slots.
#[wasm_bindgen(js_name = "startTimes")]
pub fn start_times(
    rules_json: &str,
    date: Option<String>,
    now: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let rules = parse_rules(rules_json, timezone)?;
    let now = parse_now(now)?;
    match date {
        Some(date) => {
            let date = parse_date(&date)?;
            to_json(&slot_engine::start_times(&rules, date, now).summary())
        }
        None => to_json(&StartTimesSummary::default()),
    }
}

/// End times (`"HH:MM"` strings, configured order) for `start` on `date`.
#[wasm_bindgen(js_name = "endTimes")]
pub fn end_times(
    rules_json: &str,
    date: Option<String>,
    start: Option<String>,
    now: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let rules = parse_rules(rules_json, timezone)?;
    let now = parse_now(now)?;
    let (Some(date), Some(start)) = (date, start) else {
        return Ok("[]".to_string());
    };
    let date = parse_date(&date)?;
    let start = rule::parse_time_of_day(&start).map_err(js_err)?;
    let ends: Vec<String> = slot_engine::end_times_for(&rules, date, start, now)
        .into_iter()
        .map(|t| t.format(rule::TIME_FORMAT).to_string())
        .collect();
    to_json(&ends)
}

/// Date-picker bounds as `{min_date, max_date}`, or `null` with no rules.
#[wasm_bindgen(js_name = "selectableRange")]
pub fn selectable_range(rules_json: &str, timezone: Option<String>) -> Result<String, JsValue> {
    let rules = parse_rules(rules_json, timezone)?;
    let range = slot_engine::selectable_range(&rules)
        .map(|(min_date, max_date)| DateRangeDto { min_date, max_date });
    to_json(&range)
}

/// Bookings fetch window `{start, end}` for a calendar view
/// (`"month"`, `"week"`, `"day"` or `"agenda"`).
#[wasm_bindgen(js_name = "fetchWindow")]
pub fn fetch_window(view: &str, focus: &str, today: &str) -> Result<String, JsValue> {
    let view: CalendarView = serde_json::from_value(serde_json::Value::String(view.to_string()))
        .map_err(|_| JsValue::from_str(&format!("Unknown calendar view: {}", view)))?;
    let window = calendar::fetch_window(view, parse_date(focus)?, parse_date(today)?).map_err(js_err)?;
    to_json(&window)
}
