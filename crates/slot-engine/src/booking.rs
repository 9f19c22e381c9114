//! Booking request construction.
//!
//! Turns a `Ready` selection and the student's contact details into the
//! request the reservation API expects. Only the last five digits of the
//! student UID are sent; they double as the cancellation code, which is
//! returned to the caller so it can be shown or handed to the next screen.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::{EngineError, Result};
use crate::selection::{BookingSelection, RoomId, SelectionPhase};

/// Number of UID digits kept as the cancellation code.
pub const CANCELLATION_CODE_LEN: usize = 5;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9()+\-\s]+$").expect("valid phone regex"));
static UID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid uid regex"));

/// Contact details entered on the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Ten-digit student UID.
    pub uid: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl Contact {
    /// # Errors
    /// Returns `EngineError::InvalidBooking` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&PHONE)
    }

    /// Validation with a form-specific phone pattern.
    pub(crate) fn validate_with(&self, phone: &Regex) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidBooking("name is required".to_string()));
        }
        if !EMAIL.is_match(&self.email) {
            return Err(EngineError::InvalidBooking(format!(
                "invalid email address: {:?}",
                self.email
            )));
        }
        if !phone.is_match(&self.phone) {
            return Err(EngineError::InvalidBooking(format!(
                "invalid phone number: {:?}",
                self.phone
            )));
        }
        if !UID.is_match(&self.uid) {
            return Err(EngineError::InvalidBooking(
                "UID must be 10 digits".to_string(),
            ));
        }
        Ok(())
    }
}

/// Five-digit code that authorises cancelling a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CancellationCode(String);

impl CancellationCode {
    /// # Errors
    /// Returns `EngineError::InvalidBooking` unless `raw` is exactly five ASCII digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.len() == CANCELLATION_CODE_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(EngineError::InvalidBooking(
                "cancellation code must be exactly 5 digits".to_string(),
            ))
        }
    }

    /// The last five digits of a validated ten-digit UID.
    pub fn from_uid(uid: &str) -> Result<Self> {
        let start = uid.len().saturating_sub(CANCELLATION_CODE_LEN);
        Self::parse(uid.get(start..).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CancellationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub room_id: RoomId,
    pub student_name: String,
    pub student_email: String,
    pub student_phone: String,
    /// The cancellation code; the full UID never leaves the form.
    pub uid: CancellationCode,
    pub remarks: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl BookingRequest {
    pub fn cancellation_code(&self) -> &CancellationCode {
        &self.uid
    }
}

/// Build the booking request for a `Ready` selection.
///
/// Session times are converted from the portal timezone `tz` to UTC.
///
/// # Errors
/// - `EngineError::InvalidSelection` if the selection is not `Ready`.
/// - `EngineError::InvalidBooking` if the contact details are invalid.
/// - `EngineError::NonexistentLocalTime` if a session time falls in a DST gap.
pub fn prepare_booking(
    selection: &BookingSelection,
    contact: &Contact,
    tz: Tz,
) -> Result<BookingRequest> {
    let (room_id, (start, end)) = match (selection.phase(), selection.room_id(), selection.session()) {
        (SelectionPhase::Ready, Some(room_id), Some(session)) => (room_id, session),
        (phase, _, _) => {
            return Err(EngineError::InvalidSelection(format!(
                "booking needs a complete selection, form is at {:?}",
                phase
            )))
        }
    };
    contact.validate()?;

    let request = BookingRequest {
        room_id,
        student_name: contact.name.trim().to_string(),
        student_email: contact.email.clone(),
        student_phone: contact.phone.clone(),
        uid: CancellationCode::from_uid(&contact.uid)?,
        remarks: contact.remarks.clone().unwrap_or_default(),
        start_time: clock::to_utc(start, tz)?,
        end_time: clock::to_utc(end, tz)?,
    };
    tracing::debug!(
        "prepared booking for room {} from {} to {}",
        request.room_id,
        request.start_time,
        request.end_time
    );
    Ok(request)
}
