//! Calendar-date eligibility across all of a room's rules.
//!
//! A date is `Disabled` when it is in the past or no applicable rule has a slot
//! that survives the cutoff, `Blocked` when any rule covering it lists it as
//! blocked, and `Enabled` otherwise. Blocking is global per date: one covering
//! rule is enough, even if another rule would offer slots that day.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::rule::AvailabilityRule;
use crate::slots;

/// Selectability of a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// Administratively excluded by a covering rule.
    Blocked,
    /// In the past, or no slot is left.
    Disabled,
    /// At least one slot can still be booked.
    Enabled,
}

impl DayStatus {
    pub fn is_selectable(self) -> bool {
        self == DayStatus::Enabled
    }

    /// Day class name used by the portal's date picker.
    pub fn css_class(self) -> &'static str {
        match self {
            DayStatus::Blocked => "react-datepicker__day--blocked",
            DayStatus::Disabled => "react-datepicker__day--disabled",
            DayStatus::Enabled => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Blocked => "blocked",
            DayStatus::Disabled => "disabled",
            DayStatus::Enabled => "enabled",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether any valid rule covering `date` lists it as blocked.
pub fn is_blocked(rules: &[AvailabilityRule], date: NaiveDate) -> bool {
    rules.iter().any(|rule| rule.is_valid() && rule.blocks(date))
}

/// Whether some applicable rule has at least one slot on `date` open at `now`.
///
/// Ignores blocking and the past-date check; see [`day_status`].
pub fn has_open_slot(rules: &[AvailabilityRule], date: NaiveDate, now: NaiveDateTime) -> bool {
    rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.applies_on(date))
        .any(|(index, rule)| slots::open_slots(rule, index, date, now).next().is_some())
}

/// Classify `date` at `now`.
///
/// Dates strictly before `now`'s date are always `Disabled`, whatever the rules
/// say. An empty rule set disables every date.
pub fn day_status(rules: &[AvailabilityRule], date: NaiveDate, now: NaiveDateTime) -> DayStatus {
    if date < now.date() {
        DayStatus::Disabled
    } else if is_blocked(rules, date) {
        DayStatus::Blocked
    } else if has_open_slot(rules, date, now) {
        DayStatus::Enabled
    } else {
        DayStatus::Disabled
    }
}

/// Status of every date in `[from, to]`, in order. Empty when `from > to`.
pub fn day_statuses(
    rules: &[AvailabilityRule],
    from: NaiveDate,
    to: NaiveDate,
    now: NaiveDateTime,
) -> Vec<(NaiveDate, DayStatus)> {
    let mut statuses = Vec::new();
    let mut date = from;
    while date <= to {
        statuses.push((date, day_status(rules, date, now)));
        match date.checked_add_days(Days::new(1)) {
            Some(next) => date = next,
            None => break,
        }
    }
    statuses
}

/// Bounds for the date picker: the earliest `min_date` and latest `max_date`
/// across all valid rules. `None` when there are none.
pub fn selectable_range(rules: &[AvailabilityRule]) -> Option<(NaiveDate, NaiveDate)> {
    let valid = rules.iter().filter(|rule| rule.is_valid());
    let min = valid.clone().map(|rule| rule.min_date).min()?;
    let max = valid.map(|rule| rule.max_date).max()?;
    Some((min, max))
}
