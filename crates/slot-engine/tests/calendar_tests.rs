//! Tests for bookings-calendar fetch windows.

use chrono::NaiveDate;
use slot_engine::calendar::{fetch_window, CalendarView, DateWindow};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn window(start: &str, end: &str) -> DateWindow {
    DateWindow {
        start: date(start),
        end: date(end),
    }
}

const TODAY: &str = "2026-10-18";

#[test]
fn month_view_pads_to_whole_weeks() {
    // March 2026: Sunday the 1st to Tuesday the 31st.
    assert_eq!(
        fetch_window(CalendarView::Month, date("2026-03-16"), date(TODAY)).unwrap(),
        window("2026-03-01", "2026-04-05")
    );
}

#[test]
fn month_view_handles_december() {
    // December 2026: Tuesday the 1st to Thursday the 31st.
    assert_eq!(
        fetch_window(CalendarView::Month, date("2026-12-10"), date(TODAY)).unwrap(),
        window("2026-11-29", "2027-01-03")
    );
}

#[test]
fn week_view_runs_sunday_to_saturday() {
    assert_eq!(
        fetch_window(CalendarView::Week, date("2026-03-18"), date(TODAY)).unwrap(),
        window("2026-03-15", "2026-03-22")
    );
    // A Sunday focus starts its own week.
    assert_eq!(
        fetch_window(CalendarView::Week, date("2026-03-15"), date(TODAY)).unwrap(),
        window("2026-03-15", "2026-03-22")
    );
}

#[test]
fn day_view_is_one_day() {
    assert_eq!(
        fetch_window(CalendarView::Day, date("2026-03-18"), date(TODAY)).unwrap(),
        window("2026-03-18", "2026-03-19")
    );
}

#[test]
fn agenda_view_centres_on_today() {
    assert_eq!(
        fetch_window(CalendarView::Agenda, date("2026-03-18"), date(TODAY)).unwrap(),
        window("2026-10-03", "2026-11-02")
    );
}

#[test]
fn views_parse_from_lowercase_names() {
    let view: CalendarView = serde_json::from_str("\"agenda\"").unwrap();
    assert_eq!(view, CalendarView::Agenda);
    assert_eq!(CalendarView::default(), CalendarView::Week);
}
