//! Date rules for equipment loans.
//!
//! Equipment is reserved for a checkout date, handed out at the counter with a
//! return date, and checked back in. Unlike rooms there are no time slots;
//! only the calendar windows and the stricter phone format differ.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::booking::Contact;
use crate::error::{EngineError, Result};

/// Days after today that a checkout may be reserved for.
pub const CHECKOUT_HORIZON_DAYS: u64 = 14;

/// Days after today that a return may be scheduled for.
pub const RETURN_HORIZON_DAYS: u64 = 90;

static EQUIPMENT_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+]{8,15}$").expect("valid equipment phone regex"));

/// Checkout dates offered on the reservation form: today and the next
/// [`CHECKOUT_HORIZON_DAYS`] days.
pub fn checkout_dates(today: NaiveDate) -> Vec<NaiveDate> {
    today
        .iter_days()
        .take(CHECKOUT_HORIZON_DAYS as usize + 1)
        .collect()
}

/// First and last date the return-date picker offers.
pub fn return_date_bounds(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let last = today.checked_add_days(Days::new(RETURN_HORIZON_DAYS))?;
    Some((today, last))
}

/// Whether `date` can be picked as a return date: a weekday within
/// [`return_date_bounds`].
pub fn is_return_date_allowed(date: NaiveDate, today: NaiveDate) -> bool {
    let Some((first, last)) = return_date_bounds(today) else {
        return false;
    };
    first <= date && date <= last && !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A loan is overdue once its return date has started.
pub fn is_overdue(return_date: NaiveDate, now: NaiveDateTime) -> bool {
    return_date.and_time(NaiveTime::MIN) < now
}

/// Body of `POST /equipment/reserve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentReservation {
    pub product_name: String,
    pub variant: Option<String>,
    pub student_name: String,
    pub student_email: String,
    pub student_phone: String,
    pub uid: String,
    pub checkout_date: NaiveDate,
    pub remarks: String,
}

/// Build a reservation request for an equipment item.
///
/// # Errors
/// Returns `EngineError::InvalidBooking` if the contact details are invalid
/// (phone must be 8 to 15 digits or `+`) or `checkout_date` is not one of
/// [`checkout_dates`].
pub fn prepare_reservation(
    product_name: &str,
    variant: Option<&str>,
    contact: &Contact,
    checkout_date: NaiveDate,
    today: NaiveDate,
) -> Result<EquipmentReservation> {
    contact.validate_with(&EQUIPMENT_PHONE)?;
    if !checkout_dates(today).contains(&checkout_date) {
        return Err(EngineError::InvalidBooking(format!(
            "checkout date {} is not within {} days of {}",
            checkout_date, CHECKOUT_HORIZON_DAYS, today
        )));
    }

    Ok(EquipmentReservation {
        product_name: product_name.to_string(),
        variant: variant.map(str::to_string),
        student_name: contact.name.trim().to_string(),
        student_email: contact.email.clone(),
        student_phone: contact.phone.clone(),
        uid: contact.uid.clone(),
        checkout_date,
        remarks: contact.remarks.clone().unwrap_or_default(),
    })
}

/// Body of `POST /equipment/checkout/{transaction_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(skip)]
    pub transaction_id: u64,
    #[serde(rename = "returnDate")]
    pub return_date: NaiveDate,
}

/// Hand out a reserved item with a return date.
///
/// # Errors
/// Returns `EngineError::InvalidBooking` if `return_date` is a weekend or
/// outside [`return_date_bounds`].
pub fn prepare_checkout(
    transaction_id: u64,
    return_date: NaiveDate,
    today: NaiveDate,
) -> Result<CheckoutRequest> {
    if !is_return_date_allowed(return_date, today) {
        return Err(EngineError::InvalidBooking(format!(
            "return date {} must be a weekday within {} days of {}",
            return_date, RETURN_HORIZON_DAYS, today
        )));
    }
    tracing::debug!("checkout {transaction_id} due back {return_date}");
    Ok(CheckoutRequest {
        transaction_id,
        return_date,
    })
}
