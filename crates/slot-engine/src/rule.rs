//! Availability rules -- the configuration records that say when a resource can
//! be booked.
//!
//! Rules arrive from the reservation API as JSON. Each rule covers an inclusive
//! date range, a set of weekdays (0 = Sunday .. 6 = Saturday), a time-of-day
//! range, the spacing between start times, the advance-booking cutoff, the
//! permitted session lengths and a list of blocked dates.
//!
//! Several rules may apply to the same room and overlap in date range. They are
//! evaluated independently; a start time belongs to the rule that generated it.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Wire format for times of day.
pub const TIME_FORMAT: &str = "%H:%M";

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive time-of-day bounds for slot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

/// A single availability window configured for a room.
///
/// Deserializing reads dates as written. Use [`rules_from_json_in`] when the
/// API may send dates as UTC timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord")]
pub struct AvailabilityRule {
    /// First date (inclusive) on which the rule applies.
    pub min_date: NaiveDate,
    /// Last date (inclusive) on which the rule applies.
    pub max_date: NaiveDate,
    /// Weekday numbers on which the rule is active, 0 = Sunday. Wider than a
    /// weekday needs so that a stray value fails [`AvailabilityRule::validate`]
    /// instead of the whole parse.
    pub allowed_days: BTreeSet<i64>,
    /// Time-of-day bounds; a slot exactly at `end` is still offered.
    pub time_range: TimeRange,
    /// Minutes between consecutive start times.
    pub session_interval: u32,
    /// Minimum lead time, in hours, between now and a slot's start.
    pub cutoff_hours: u32,
    /// Permitted session lengths in minutes, in display order.
    pub allowed_durations: Vec<u32>,
    /// Dates excluded even though they fall inside the range.
    pub blocked_dates: BTreeSet<NaiveDate>,
}

impl AvailabilityRule {
    /// Whether `date` lies inside `[min_date, max_date]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.min_date <= date && date <= self.max_date
    }

    pub fn allows_weekday(&self, date: NaiveDate) -> bool {
        self.allowed_days.contains(&i64::from(weekday_number(date)))
    }

    /// Whether the rule generates slots on `date` (range and weekday both match).
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.covers(date) && self.allows_weekday(date)
    }

    /// Whether the rule blocks `date`. Only a rule covering the date can block it.
    pub fn blocks(&self, date: NaiveDate) -> bool {
        self.covers(date) && self.blocked_dates.contains(&date)
    }

    /// The latest instant on `date` that a session may end at.
    pub fn day_end(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.time_range.end)
    }

    /// Check the rule's invariants.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRule` naming the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(EngineError::InvalidRule)
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.min_date > self.max_date {
            return Err(format!(
                "min_date {} is after max_date {}",
                self.min_date, self.max_date
            ));
        }
        if self.time_range.start > self.time_range.end {
            return Err(format!(
                "time range start {} is after end {}",
                self.time_range.start.format(TIME_FORMAT),
                self.time_range.end.format(TIME_FORMAT)
            ));
        }
        if self.session_interval == 0 {
            return Err("session_interval must be positive".to_string());
        }
        if let Some(day) = self.allowed_days.iter().find(|&&d| !(0..=6).contains(&d)) {
            return Err(format!("weekday {} is outside 0..=6", day));
        }
        if self.allowed_durations.contains(&0) {
            return Err("allowed_durations must all be positive".to_string());
        }
        Ok(())
    }
}

/// Weekday number of `date` with Sunday = 0.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Validate every rule, failing on the first invalid one.
///
/// # Errors
/// Returns `EngineError::InvalidRule` with the offending rule's index.
pub fn validate_rules(rules: &[AvailabilityRule]) -> Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        if let Err(reason) = rule.check() {
            return Err(EngineError::InvalidRule(format!("rule #{}: {}", index, reason)));
        }
    }
    Ok(())
}

/// Drop invalid rules, logging each one.
///
/// Slot choices made against the returned list index into it, not into the input.
pub fn retain_valid(rules: Vec<AvailabilityRule>) -> Vec<AvailabilityRule> {
    rules
        .into_iter()
        .enumerate()
        .filter_map(|(index, rule)| match rule.check() {
            Ok(()) => Some(rule),
            Err(reason) => {
                tracing::warn!("ignoring availability rule #{index}: {reason}");
                None
            }
        })
        .collect()
}

/// Parse a JSON array of rules in the reservation API's shape.
///
/// Dates are taken as written, including the date part of a timestamp.
///
/// # Errors
/// Returns `EngineError::InvalidRule` if the JSON does not match the rule shape.
/// Rule invariants are not checked here; see [`validate_rules`] and [`retain_valid`].
pub fn rules_from_json(json: &str) -> Result<Vec<AvailabilityRule>> {
    serde_json::from_str(json)
        .map_err(|e| EngineError::InvalidRule(format!("malformed rules JSON: {}", e)))
}

/// Like [`rules_from_json`], but a date sent as a timestamp with a UTC offset
/// is read as the calendar date it falls on in the portal timezone `tz`.
///
/// # Errors
/// Returns `EngineError::InvalidRule` if the JSON does not match the rule shape
/// or a date cannot be read.
pub fn rules_from_json_in(json: &str, tz: Tz) -> Result<Vec<AvailabilityRule>> {
    let records: Vec<RuleRecord> = serde_json::from_str(json)
        .map_err(|e| EngineError::InvalidRule(format!("malformed rules JSON: {}", e)))?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .resolve(Some(tz))
                .map_err(|e| EngineError::InvalidRule(format!("rule #{}: {}", index, e)))
        })
        .collect()
}

/// Parse an `HH:MM` (or `HH:MM:SS`) time of day. Seconds are dropped.
///
/// # Errors
/// Returns `EngineError::InvalidTime` if the string is neither format.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
        .and_then(|t| NaiveTime::from_hms_opt(t.hour(), t.minute(), 0))
        .ok_or_else(|| EngineError::InvalidTime(raw.to_string()))
}

/// Parse a calendar date. A full ISO datetime is accepted and only its date
/// part, as written, is kept.
///
/// # Errors
/// Returns `EngineError::InvalidDate` if no `YYYY-MM-DD` prefix can be read.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = match trimmed.find(['T', ' ']) {
        Some(i) => &trimmed[..i],
        None => trimmed,
    };
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| EngineError::InvalidDate(raw.to_string()))
}

/// Parse a calendar date as seen from `tz`.
///
/// An RFC 3339 timestamp (`2026-03-15T16:00:00.000Z`) is converted to `tz`
/// before its date is taken. Anything else goes through [`parse_date`].
///
/// # Errors
/// Returns `EngineError::InvalidDate` if no date can be read.
pub fn parse_date_in(raw: &str, tz: Tz) -> Result<NaiveDate> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(instant) => Ok(instant.with_timezone(&tz).date_naive()),
        Err(_) => parse_date(raw),
    }
}

/// A rule as it appears on the wire, before its dates are read.
#[derive(Deserialize)]
struct RuleRecord {
    min_date: String,
    max_date: String,
    allowed_days: BTreeSet<i64>,
    time_range: TimeRange,
    session_interval: u32,
    cutoff_hours: u32,
    allowed_durations: Vec<u32>,
    /// `null` and a missing field both mean "no blocked dates".
    #[serde(default)]
    blocked_dates: Option<Vec<String>>,
}

impl RuleRecord {
    fn resolve(self, tz: Option<Tz>) -> Result<AvailabilityRule> {
        let read = |raw: &str| match tz {
            Some(tz) => parse_date_in(raw, tz),
            None => parse_date(raw),
        };
        Ok(AvailabilityRule {
            min_date: read(self.min_date.as_str())?,
            max_date: read(self.max_date.as_str())?,
            allowed_days: self.allowed_days,
            time_range: self.time_range,
            session_interval: self.session_interval,
            cutoff_hours: self.cutoff_hours,
            allowed_durations: self.allowed_durations,
            blocked_dates: self
                .blocked_dates
                .unwrap_or_default()
                .iter()
                .map(|raw| read(raw.as_str()))
                .collect::<Result<_>>()?,
        })
    }
}

impl TryFrom<RuleRecord> for AvailabilityRule {
    type Error = EngineError;

    fn try_from(record: RuleRecord) -> Result<Self> {
        record.resolve(None)
    }
}

/// Serde adapter for `HH:MM` times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(super::TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(D::Error::custom)
    }

    /// Same as the parent module, for `Option<NaiveTime>` (`null` when absent).
    pub mod option {
        use chrono::NaiveTime;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.serialize_some(&t.format(super::super::TIME_FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_time_of_day(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}
