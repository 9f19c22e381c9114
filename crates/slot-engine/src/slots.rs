//! Slot generation and the cutoff filter.
//!
//! A rule's start times are `time_range.start`, then every `session_interval`
//! minutes after it, up to and including `time_range.end`. The cutoff filter
//! keeps a slot at instant `T` only while `now < T - cutoff_hours`, so it is
//! evaluated per slot and slots disappear one by one as `now` advances.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::rule::{hhmm, AvailabilityRule};

/// Iterator over the raw times of day a rule offers.
///
/// Finite. Clone it before iterating, or call [`slot_times`] again, to walk
/// the same sequence twice.
#[derive(Debug, Clone)]
pub struct SlotTimes {
    next_secs: Option<u32>,
    end_secs: u32,
    step_secs: u32,
}

impl Iterator for SlotTimes {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        let current = self.next_secs?;
        if current > self.end_secs {
            self.next_secs = None;
            return None;
        }
        self.next_secs = current.checked_add(self.step_secs);
        NaiveTime::from_num_seconds_from_midnight_opt(current, 0)
    }
}

/// Enumerate the times of day `rule` offers, ascending.
///
/// An invalid rule (e.g. a zero interval) yields nothing.
pub fn slot_times(rule: &AvailabilityRule) -> SlotTimes {
    let valid = rule.is_valid();
    SlotTimes {
        next_secs: valid.then(|| rule.time_range.start.num_seconds_from_midnight()),
        end_secs: rule.time_range.end.num_seconds_from_midnight(),
        step_secs: rule.session_interval.saturating_mul(60),
    }
}

/// A concrete offerable start time together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSlot<'a> {
    pub start: NaiveDateTime,
    pub rule: &'a AvailabilityRule,
    /// Position of `rule` in the rule slice the slot was generated from.
    pub rule_index: usize,
}

impl CandidateSlot<'_> {
    pub fn time(&self) -> NaiveTime {
        self.start.time()
    }

    /// Tie-break key: earlier-configured rules win at the same clock time.
    pub fn priority(&self) -> NaiveTime {
        self.rule.time_range.start
    }

    /// Whether the slot is still offered at `now`.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        passes_cutoff(self.start, self.rule.cutoff_hours, now)
    }

    pub fn choice(&self) -> SlotChoice {
        SlotChoice {
            time: self.time(),
            rule_index: self.rule_index,
        }
    }
}

/// An owned reference to a slot: its time and the index of its owning rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotChoice {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub rule_index: usize,
}

impl SlotChoice {
    /// Rebuild the candidate slot on `date`, if `rule_index` is in range.
    pub fn resolve<'a>(
        &self,
        rules: &'a [AvailabilityRule],
        date: NaiveDate,
    ) -> Option<CandidateSlot<'a>> {
        rules.get(self.rule_index).map(|rule| CandidateSlot {
            start: date.and_time(self.time),
            rule,
            rule_index: self.rule_index,
        })
    }
}

/// All slots `rule` generates on `date`, before the cutoff filter.
///
/// The caller is responsible for checking that the rule applies on `date`.
pub fn generate_slots(
    rule: &AvailabilityRule,
    rule_index: usize,
    date: NaiveDate,
) -> impl Iterator<Item = CandidateSlot<'_>> + Clone {
    slot_times(rule).map(move |time| CandidateSlot {
        start: date.and_time(time),
        rule,
        rule_index,
    })
}

/// Slots `rule` generates on `date` that survive the cutoff at `now`.
pub fn open_slots(
    rule: &AvailabilityRule,
    rule_index: usize,
    date: NaiveDate,
    now: NaiveDateTime,
) -> impl Iterator<Item = CandidateSlot<'_>> + Clone {
    generate_slots(rule, rule_index, date).filter(move |slot| slot.is_open_at(now))
}

/// `true` iff `now` is strictly before `slot_start - cutoff_hours`.
pub fn passes_cutoff(slot_start: NaiveDateTime, cutoff_hours: u32, now: NaiveDateTime) -> bool {
    match slot_start.checked_sub_signed(Duration::hours(i64::from(cutoff_hours))) {
        Some(deadline) => now < deadline,
        None => false,
    }
}
