//! Property-based tests for the slot engine using proptest.
//!
//! These check invariants that must hold for *any* valid rule set, not just
//! the hand-picked cases in the other test files.

use std::collections::BTreeSet;

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use slot_engine::eligibility::{day_status, DayStatus};
use slot_engine::policy::start_times;
use slot_engine::rule::{AvailabilityRule, TimeRange};
use slot_engine::slots::{generate_slots, slot_times};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    base_date().checked_add_days(Days::new(offset)).unwrap()
}

fn minute_of_day(minutes: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).unwrap()
}

/// A valid rule somewhere in March/April 2026.
fn arb_rule() -> impl Strategy<Value = AvailabilityRule> {
    (
        0u64..30,
        0u64..30,
        prop::collection::btree_set(0i64..=6, 0..=7),
        0u32..=1200,
        0u32..=600,
        5u32..=180,
        0u32..=72,
        prop::collection::vec(5u32..=240, 1..4),
        prop::collection::btree_set(0u64..60, 0..5),
    )
        .prop_map(
            |(start_offset, span, days, start_min, len, interval, cutoff, durations, blocked)| {
                let end_min = (start_min + len).min(1439);
                AvailabilityRule {
                    min_date: day(start_offset),
                    max_date: day(start_offset + span),
                    allowed_days: days,
                    time_range: TimeRange {
                        start: minute_of_day(start_min),
                        end: minute_of_day(end_min),
                    },
                    session_interval: interval,
                    cutoff_hours: cutoff,
                    allowed_durations: durations,
                    blocked_dates: blocked.into_iter().map(day).collect::<BTreeSet<_>>(),
                }
            },
        )
}

fn arb_rules() -> impl Strategy<Value = Vec<AvailabilityRule>> {
    prop::collection::vec(arb_rule(), 0..4)
}

/// A "now" within the rules' window, at minute precision.
fn arb_now() -> impl Strategy<Value = NaiveDateTime> {
    (0u64..60, 0u32..1440).prop_map(|(offset, minute)| day(offset).and_time(minute_of_day(minute)))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..60).prop_map(day)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn past_dates_are_always_disabled(rules in arb_rules(), now in arb_now(), back in 1u64..30) {
        let past = now.date().checked_sub_days(Days::new(back)).unwrap();
        prop_assert_eq!(day_status(&rules, past, now), DayStatus::Disabled);
    }

    #[test]
    fn generated_slots_stay_within_time_range(rule in arb_rule()) {
        for time in slot_times(&rule) {
            prop_assert!(time >= rule.time_range.start);
            prop_assert!(time <= rule.time_range.end);
        }
    }

    #[test]
    fn generated_slots_are_strictly_ascending(rule in arb_rule()) {
        let times: Vec<_> = slot_times(&rule).collect();
        prop_assert!(!times.is_empty());
        for pair in times.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn slots_only_disappear_as_time_advances(
        rules in arb_rules(),
        date in arb_date(),
        now1 in arb_now(),
        advance in 0i64..(72 * 60),
    ) {
        let now2 = now1 + Duration::minutes(advance);
        let earlier = start_times(&rules, date, now1).choices();
        let later = start_times(&rules, date, now2).choices();
        for choice in &later {
            prop_assert!(earlier.contains(choice), "{:?} appeared at {}", choice, now2);
        }
    }

    #[test]
    fn blocked_dates_are_never_enabled(rules in arb_rules(), now in arb_now(), pick in any::<prop::sample::Index>()) {
        let blocked: Vec<(NaiveDate, &AvailabilityRule)> = rules
            .iter()
            .flat_map(|rule| rule.blocked_dates.iter().map(move |d| (*d, rule)))
            .filter(|(d, rule)| rule.covers(*d))
            .collect();
        prop_assume!(!blocked.is_empty());
        let (date, _) = blocked[pick.index(blocked.len())];
        prop_assert_ne!(day_status(&rules, date, now), DayStatus::Enabled);
        prop_assert!(start_times(&rules, date, now).is_empty());
    }

    #[test]
    fn offered_slots_belong_to_their_owner(rules in arb_rules(), date in arb_date(), now in arb_now()) {
        let options = start_times(&rules, date, now);
        for slot in &options.slots {
            let owner = &rules[slot.rule_index];
            prop_assert!(owner.applies_on(date));
            prop_assert!(generate_slots(owner, slot.rule_index, date).any(|s| s.start == slot.start));
        }
    }

    #[test]
    fn start_times_are_ordered_by_time_then_priority(rules in arb_rules(), date in arb_date(), now in arb_now()) {
        let options = start_times(&rules, date, now);
        for pair in options.slots.windows(2) {
            prop_assert!((pair[0].start, pair[0].priority()) <= (pair[1].start, pair[1].priority()));
        }
    }

    #[test]
    fn enabled_exactly_when_start_times_exist(rules in arb_rules(), date in arb_date(), now in arb_now()) {
        let status = day_status(&rules, date, now);
        let has_slots = !start_times(&rules, date, now).is_empty();
        if date >= now.date() {
            prop_assert_eq!(status == DayStatus::Enabled, has_slots);
        }
    }
}
