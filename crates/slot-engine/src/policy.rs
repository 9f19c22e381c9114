//! Ordering of candidate slots across overlapping rules, and the default pick.
//!
//! Slots are ordered by start time, then by the owning rule's
//! `time_range.start`, so when two rules offer the same clock time the
//! earlier-configured rule owns it. The first slot in that order is the
//! default start; its default end is the first end-time option.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::duration;
use crate::eligibility;
use crate::rule::{hhmm, AvailabilityRule};
use crate::slots::{self, CandidateSlot, SlotChoice};

/// Ordered start-time options for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTimes<'a> {
    pub date: NaiveDate,
    pub slots: Vec<CandidateSlot<'a>>,
}

impl<'a> StartTimes<'a> {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn times(&self) -> Vec<NaiveTime> {
        self.slots.iter().map(CandidateSlot::time).collect()
    }

    pub fn default_slot(&self) -> Option<&CandidateSlot<'a>> {
        self.slots.first()
    }

    pub fn default_start(&self) -> Option<NaiveTime> {
        self.default_slot().map(CandidateSlot::time)
    }

    /// First end-time option for the default start, if any.
    pub fn default_end(&self) -> Option<NaiveTime> {
        self.default_slot()
            .and_then(|slot| duration::end_times(slot).first().copied())
    }

    /// The slot offered at `time`. On a tie the higher-priority rule's slot.
    pub fn find(&self, time: NaiveTime) -> Option<&CandidateSlot<'a>> {
        self.slots.iter().find(|slot| slot.time() == time)
    }

    pub fn choices(&self) -> Vec<SlotChoice> {
        self.slots.iter().map(CandidateSlot::choice).collect()
    }

    pub fn summary(&self) -> StartTimesSummary {
        StartTimesSummary {
            date: Some(self.date),
            slots: self.choices(),
            default_start: self.default_start(),
            default_end: self.default_end(),
        }
    }
}

/// Serializable view of [`StartTimes`] for the portal front end.
///
/// The default value, with no date and no slots, is what the form shows
/// before a date is picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartTimesSummary {
    pub date: Option<NaiveDate>,
    pub slots: Vec<SlotChoice>,
    #[serde(with = "hhmm::option")]
    pub default_start: Option<NaiveTime>,
    #[serde(with = "hhmm::option")]
    pub default_end: Option<NaiveTime>,
}

/// Ordered start times bookable on `date` at `now`, across all rules.
///
/// Empty for a blocked date, a past date, or when no rule applies.
pub fn start_times(rules: &[AvailabilityRule], date: NaiveDate, now: NaiveDateTime) -> StartTimes<'_> {
    if eligibility::is_blocked(rules, date) {
        tracing::debug!("{date} is blocked, no start times");
        return StartTimes {
            date,
            slots: Vec::new(),
        };
    }

    let mut candidates: Vec<CandidateSlot<'_>> = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.applies_on(date))
        .flat_map(|(index, rule)| slots::open_slots(rule, index, date, now))
        .collect();

    // Stable: rules with equal priority keep their configured order.
    candidates.sort_by_key(|slot| (slot.start, slot.priority()));

    tracing::debug!("{date}: {} start times open at {now}", candidates.len());
    StartTimes {
        date,
        slots: candidates,
    }
}
