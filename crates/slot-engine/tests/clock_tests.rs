//! Tests for portal timezone conversions.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use slot_engine::clock::{parse_timezone, to_local, to_utc};
use slot_engine::EngineError;

fn local(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

#[test]
fn unknown_timezone_is_rejected() {
    assert!(matches!(
        parse_timezone("Mars/Olympus_Mons"),
        Err(EngineError::InvalidTimezone(_))
    ));
}

#[test]
fn local_and_utc_round_trip_outside_transitions() {
    let tz = parse_timezone("Europe/London").unwrap();
    let instant = to_utc(local("2026-07-01T09:00"), tz).unwrap();
    assert_eq!(instant, Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap());
    assert_eq!(to_local(instant, tz), local("2026-07-01T09:00"));
}

#[test]
fn ambiguous_local_time_resolves_to_earlier_instant() {
    // 2026-11-01 01:30 happens twice in New York.
    let tz = parse_timezone("America/New_York").unwrap();
    let instant = to_utc(local("2026-11-01T01:30"), tz).unwrap();
    assert_eq!(instant, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
}

#[test]
fn gap_local_time_is_an_error() {
    let tz = parse_timezone("America/New_York").unwrap();
    let gap = NaiveDate::from_ymd_opt(2026, 3, 8)
        .unwrap()
        .and_hms_opt(2, 30, 0)
        .unwrap();
    assert!(matches!(to_utc(gap, tz), Err(EngineError::NonexistentLocalTime(_))));
}
