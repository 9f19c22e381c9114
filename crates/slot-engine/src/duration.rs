//! End-time options for a chosen start.
//!
//! For each of the owning rule's durations, in configured order, the session
//! end `start + d` is offered if it does not pass the rule's `time_range.end`
//! on the same date. The order is not re-sorted by end time: the first
//! surviving entry is the default end.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::policy;
use crate::rule::AvailabilityRule;
use crate::slots::CandidateSlot;

/// End times for `slot`, in the owning rule's duration order.
pub fn end_times(slot: &CandidateSlot<'_>) -> Vec<NaiveTime> {
    let day_end = slot.rule.day_end(slot.start.date());
    slot.rule
        .allowed_durations
        .iter()
        .filter_map(|&minutes| {
            slot.start
                .checked_add_signed(Duration::minutes(i64::from(minutes)))
        })
        .filter(|end| *end <= day_end)
        .map(|end| end.time())
        .collect()
}

/// End times for the start `start` on `date`, resolving its owner among the
/// slots open at `now`. Empty when `start` is not offered.
pub fn end_times_for(
    rules: &[AvailabilityRule],
    date: NaiveDate,
    start: NaiveTime,
    now: NaiveDateTime,
) -> Vec<NaiveTime> {
    policy::start_times(rules, date, now)
        .find(start)
        .map(end_times)
        .unwrap_or_default()
}

/// Keep `previous` if it is still an option, otherwise fall back to the first
/// option (or nothing).
pub fn reconcile_end(options: &[NaiveTime], previous: Option<NaiveTime>) -> Option<NaiveTime> {
    match previous {
        Some(end) if options.contains(&end) => Some(end),
        _ => options.first().copied(),
    }
}
