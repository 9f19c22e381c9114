//! Fetch windows for the bookings calendar.
//!
//! The calendar asks the API for existing bookings over a date range that
//! depends on its view. Weeks start on Sunday. For the grid views `end` is
//! one day past the last visible date.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Days either side of today covered by the agenda view.
pub const AGENDA_SPAN_DAYS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Month,
    #[default]
    Week,
    Day,
    Agenda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Bookings fetch window for `view` focused on `focus`.
///
/// The agenda view ignores `focus` and centres on `today`.
///
/// # Errors
/// Returns `EngineError::InvalidDate` if the window leaves chrono's date range.
pub fn fetch_window(view: CalendarView, focus: NaiveDate, today: NaiveDate) -> Result<DateWindow> {
    let window = match view {
        CalendarView::Month => {
            let first = focus.with_day(1);
            let last = first
                .and_then(|d| d.checked_add_months(Months::new(1)))
                .and_then(|d| d.pred_opt());
            match (first, last) {
                (Some(first), Some(last)) => week_start(first)
                    .zip(week_end(last).and_then(next_day))
                    .map(|(start, end)| DateWindow { start, end }),
                _ => None,
            }
        }
        CalendarView::Week => week_start(focus)
            .zip(week_end(focus).and_then(next_day))
            .map(|(start, end)| DateWindow { start, end }),
        CalendarView::Day => next_day(focus).map(|end| DateWindow { start: focus, end }),
        CalendarView::Agenda => today
            .checked_sub_days(Days::new(AGENDA_SPAN_DAYS))
            .zip(today.checked_add_days(Days::new(AGENDA_SPAN_DAYS)))
            .map(|(start, end)| DateWindow { start, end }),
    };
    window.ok_or_else(|| EngineError::InvalidDate(format!("{:?} window around {}", view, focus)))
}

/// The Sunday on or before `date`.
fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

/// The Saturday on or after `date`.
fn week_end(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(6 - date.weekday().num_days_from_sunday())))
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.succ_opt()
}
