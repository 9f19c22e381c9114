//! # slot-engine
//!
//! Availability and slot computation for a self-service reservation portal.
//!
//! Given the availability rules configured for a room (date ranges, weekdays,
//! a time-of-day range, a session interval, an advance-booking cutoff and
//! blocked dates) and the current local time, the engine answers three
//! questions: is a calendar date selectable, which start times can be booked
//! on it, and which end times are valid for a chosen start.
//!
//! Every query is a pure function of `(rules, date, now)`. Because `now` is an
//! input, the same query asked later may return fewer slots as cutoffs pass.
//!
//! ## Modules
//!
//! - [`rule`] -- availability rule records, wire format and validation
//! - [`slots`] -- raw slot generation and the cutoff filter
//! - [`eligibility`] -- blocked / disabled / enabled status of calendar dates
//! - [`policy`] -- ordering of candidate slots and the default pick
//! - [`duration`] -- end-time options for a chosen start
//! - [`selection`] -- the room → date → start → end selection lifecycle
//! - [`booking`] -- contact validation and booking request construction
//! - [`equipment`] -- checkout, return and overdue dates for equipment loans
//! - [`calendar`] -- booking-calendar fetch windows per view
//! - [`clock`] -- portal timezone handling
//! - [`error`] -- Error types

pub mod booking;
pub mod calendar;
pub mod clock;
pub mod duration;
pub mod eligibility;
pub mod equipment;
pub mod error;
pub mod policy;
pub mod rule;
pub mod selection;
pub mod slots;

pub use duration::{end_times, end_times_for};
pub use eligibility::{day_status, day_statuses, selectable_range, DayStatus};
pub use error::EngineError;
pub use policy::{start_times, StartTimes};
pub use rule::{retain_valid, validate_rules, AvailabilityRule, TimeRange};
pub use selection::{BookingSelection, SelectionPhase};
pub use slots::{CandidateSlot, SlotChoice};
