//! The booking form's selection lifecycle.
//!
//! ```text
//! NoRoom -> RoomChosen -> DateChosen -> StartChosen -> Ready
//! ```
//!
//! Changing the room clears everything downstream. Choosing a date recomputes
//! the start times and auto-selects the default start and end, so a date with
//! open slots lands directly in `Ready`. Changing the start only recomputes the
//! end options, keeping the previous end when it is still valid.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::duration;
use crate::eligibility::{self, DayStatus};
use crate::error::{EngineError, Result};
use crate::policy;
use crate::rule::{self, AvailabilityRule};
use crate::slots::{CandidateSlot, SlotChoice};

/// Identifier of a bookable room as issued by the reservation API.
pub type RoomId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPhase {
    NoRoom,
    RoomChosen,
    DateChosen,
    StartChosen,
    Ready,
}

/// Current state of the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingSelection {
    room_id: Option<RoomId>,
    rules: Vec<AvailabilityRule>,
    date: Option<NaiveDate>,
    slots: Vec<SlotChoice>,
    start: Option<SlotChoice>,
    end_options: Vec<NaiveTime>,
    end: Option<NaiveTime>,
}

impl BookingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.room_id.is_none() {
            SelectionPhase::NoRoom
        } else if self.date.is_none() {
            SelectionPhase::RoomChosen
        } else if self.start.is_none() {
            SelectionPhase::DateChosen
        } else if self.end.is_none() {
            SelectionPhase::StartChosen
        } else {
            SelectionPhase::Ready
        }
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.room_id
    }

    /// The room's rules, with invalid ones already dropped.
    pub fn rules(&self) -> &[AvailabilityRule] {
        &self.rules
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Start-time options for the chosen date, in display order.
    pub fn slots(&self) -> &[SlotChoice] {
        &self.slots
    }

    pub fn start(&self) -> Option<SlotChoice> {
        self.start
    }

    pub fn end_options(&self) -> &[NaiveTime] {
        &self.end_options
    }

    pub fn end(&self) -> Option<NaiveTime> {
        self.end
    }

    /// Date-picker status of `date` for the chosen room.
    pub fn day_status(&self, date: NaiveDate, now: NaiveDateTime) -> DayStatus {
        eligibility::day_status(&self.rules, date, now)
    }

    /// The rule owning the chosen start.
    pub fn owner_rule(&self) -> Option<&AvailabilityRule> {
        self.start.and_then(|choice| self.rules.get(choice.rule_index))
    }

    /// Start and end instants of the chosen session, once the form is `Ready`.
    pub fn session(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let date = self.date?;
        let start = self.start?;
        let end = self.end?;
        Some((date.and_time(start.time), date.and_time(end)))
    }

    /// Switch to another room. Every downstream selection is cleared.
    pub fn choose_room(&mut self, room_id: RoomId, rules: Vec<AvailabilityRule>) {
        tracing::debug!("room {room_id} chosen with {} rules", rules.len());
        *self = Self {
            room_id: Some(room_id),
            rules: rule::retain_valid(rules),
            ..Self::default()
        };
    }

    /// Choose a date and auto-select the default start and end.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidSelection` if no room is chosen or the date
    /// is not selectable at `now`. The selection is left unchanged.
    pub fn choose_date(&mut self, date: NaiveDate, now: NaiveDateTime) -> Result<()> {
        if self.room_id.is_none() {
            return Err(EngineError::InvalidSelection(
                "choose a room before a date".to_string(),
            ));
        }
        let status = self.day_status(date, now);
        if !status.is_selectable() {
            return Err(EngineError::InvalidSelection(format!(
                "{} is {}",
                date, status
            )));
        }

        self.date = Some(date);
        self.start = None;
        self.end = None;
        self.recompute(now);
        Ok(())
    }

    /// Choose one of the offered start times.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidSelection` if `time` is not offered.
    pub fn choose_start(&mut self, time: NaiveTime) -> Result<()> {
        let choice = self
            .slots
            .iter()
            .find(|slot| slot.time == time)
            .copied()
            .ok_or_else(|| {
                EngineError::InvalidSelection(format!(
                    "{} is not an offered start time",
                    time.format(rule::TIME_FORMAT)
                ))
            })?;
        self.start = Some(choice);
        self.refresh_end_options();
        Ok(())
    }

    /// Choose one of the offered end times.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidSelection` if `time` is not offered.
    pub fn choose_end(&mut self, time: NaiveTime) -> Result<()> {
        if !self.end_options.contains(&time) {
            return Err(EngineError::InvalidSelection(format!(
                "{} is not an offered end time",
                time.format(rule::TIME_FORMAT)
            )));
        }
        self.end = Some(time);
        Ok(())
    }

    /// Re-run the slot computation after `now` has moved forward.
    ///
    /// A chosen start that is still offered is kept; otherwise the new default
    /// is selected, or nothing when every slot has passed its cutoff.
    pub fn refresh(&mut self, now: NaiveDateTime) {
        if self.date.is_some() {
            self.recompute(now);
        }
    }

    fn recompute(&mut self, now: NaiveDateTime) {
        let Some(date) = self.date else {
            return;
        };
        let slots = policy::start_times(&self.rules, date, now).choices();

        self.start = match self.start {
            Some(current) if slots.contains(&current) => Some(current),
            _ => slots.first().copied(),
        };
        self.slots = slots;
        self.refresh_end_options();
    }

    fn refresh_end_options(&mut self) {
        let options = self
            .candidate()
            .map(|slot| duration::end_times(&slot))
            .unwrap_or_default();
        self.end_options = options;
        self.end = duration::reconcile_end(&self.end_options, self.end);
    }

    fn candidate(&self) -> Option<CandidateSlot<'_>> {
        let date = self.date?;
        self.start?.resolve(&self.rules, date)
    }
}
