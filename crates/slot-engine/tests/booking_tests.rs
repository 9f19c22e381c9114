//! Tests for contact validation and booking request construction.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use slot_engine::booking::{prepare_booking, CancellationCode, Contact};
use slot_engine::clock::parse_timezone;
use slot_engine::rule::{AvailabilityRule, TimeRange};
use slot_engine::selection::BookingSelection;
use slot_engine::EngineError;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn contact() -> Contact {
    Contact {
        name: "  Mei Chan ".to_string(),
        email: "mei@example.edu".to_string(),
        phone: "+852 1234-5678".to_string(),
        uid: "3035123456".to_string(),
        remarks: Some("Group study".to_string()),
    }
}

fn ready_selection(min: &str, max: &str, day: &str) -> BookingSelection {
    let rule = AvailabilityRule {
        min_date: date(min),
        max_date: date(max),
        allowed_days: (0..=6).collect(),
        time_range: TimeRange {
            start: time("09:00"),
            end: time("12:00"),
        },
        session_interval: 60,
        cutoff_hours: 0,
        allowed_durations: vec![90],
        blocked_dates: BTreeSet::new(),
    };
    let mut selection = BookingSelection::new();
    selection.choose_room(42, vec![rule]);
    let now = date(min).pred_opt().unwrap().and_hms_opt(12, 0, 0).unwrap();
    selection.choose_date(date(day), now).unwrap();
    selection
}

// ── Contact validation ──────────────────────────────────────────────────────

#[test]
fn well_formed_contact_passes() {
    assert!(contact().validate().is_ok());
}

#[test]
fn each_field_is_checked() {
    let cases: Vec<(Contact, &str)> = vec![
        (Contact { name: "   ".into(), ..contact() }, "name"),
        (Contact { email: "mei@example".into(), ..contact() }, "email"),
        (Contact { email: "mei chan@example.edu".into(), ..contact() }, "email"),
        (Contact { phone: "call me".into(), ..contact() }, "phone"),
        (Contact { phone: "".into(), ..contact() }, "phone"),
        (Contact { uid: "12345".into(), ..contact() }, "UID"),
        (Contact { uid: "30351234ab".into(), ..contact() }, "UID"),
    ];
    for (c, field) in cases {
        let err = c.validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidBooking(_)));
        assert!(err.to_string().contains(field), "expected {} error, got: {}", field, err);
    }
}

// ── Cancellation codes ──────────────────────────────────────────────────────

#[test]
fn cancellation_code_is_last_five_uid_digits() {
    let code = CancellationCode::from_uid("3035123456").unwrap();
    assert_eq!(code.as_str(), "23456");
    assert_eq!(code.to_string(), "23456");
}

#[test]
fn cancellation_code_requires_exactly_five_digits() {
    assert!(CancellationCode::parse("12345").is_ok());
    assert!(CancellationCode::parse(" 12345 ").is_ok());
    assert!(CancellationCode::parse("1234").is_err());
    assert!(CancellationCode::parse("123456").is_err());
    assert!(CancellationCode::parse("12a45").is_err());
    assert!(CancellationCode::from_uid("12").is_err());
}

// ── prepare_booking ─────────────────────────────────────────────────────────

#[test]
fn builds_request_in_utc() {
    let selection = ready_selection("2026-03-01", "2026-03-31", "2026-03-16");
    let tz = parse_timezone("Asia/Hong_Kong").unwrap();
    let request = prepare_booking(&selection, &contact(), tz).unwrap();

    assert_eq!(request.room_id, 42);
    assert_eq!(request.student_name, "Mei Chan");
    assert_eq!(request.cancellation_code().as_str(), "23456");
    assert_eq!(request.remarks, "Group study");
    // 09:00-10:30 in Hong Kong (UTC+8).
    assert_eq!(request.start_time, Utc.with_ymd_and_hms(2026, 3, 16, 1, 0, 0).unwrap());
    assert_eq!(request.end_time, Utc.with_ymd_and_hms(2026, 3, 16, 2, 30, 0).unwrap());
}

#[test]
fn request_never_carries_full_uid() {
    let selection = ready_selection("2026-03-01", "2026-03-31", "2026-03-16");
    let request = prepare_booking(&selection, &contact(), parse_timezone("UTC").unwrap()).unwrap();
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["uid"], "23456");
    assert_eq!(json["start_time"], "2026-03-16T09:00:00Z");
    assert!(!json.to_string().contains("3035123456"));
}

#[test]
fn incomplete_selection_is_refused() {
    let mut selection = BookingSelection::new();
    selection.choose_room(42, Vec::new());
    let err = prepare_booking(&selection, &contact(), parse_timezone("UTC").unwrap()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidSelection(_)));
}

#[test]
fn invalid_contact_is_refused() {
    let selection = ready_selection("2026-03-01", "2026-03-31", "2026-03-16");
    let bad = Contact { uid: "123".into(), ..contact() };
    let err = prepare_booking(&selection, &bad, parse_timezone("UTC").unwrap()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidBooking(_)));
}

#[test]
fn session_in_dst_gap_is_refused() {
    // 2026-03-08 02:00-03:00 does not exist in New York.
    let rule = AvailabilityRule {
        min_date: date("2026-03-01"),
        max_date: date("2026-03-31"),
        allowed_days: (0..=6).collect(),
        time_range: TimeRange {
            start: time("02:30"),
            end: time("04:00"),
        },
        session_interval: 60,
        cutoff_hours: 0,
        allowed_durations: vec![60],
        blocked_dates: BTreeSet::new(),
    };
    let mut selection = BookingSelection::new();
    selection.choose_room(1, vec![rule]);
    let now = date("2026-03-01").and_hms_opt(0, 0, 0).unwrap();
    selection.choose_date(date("2026-03-08"), now).unwrap();

    let tz = parse_timezone("America/New_York").unwrap();
    let err = prepare_booking(&selection, &contact(), tz).unwrap_err();
    assert!(matches!(err, EngineError::NonexistentLocalTime(_)));
}
