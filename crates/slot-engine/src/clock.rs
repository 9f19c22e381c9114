//! Portal timezone handling.
//!
//! Rules and slots are expressed in the portal's local wall-clock time. The
//! engine works on naive local datetimes; this module turns the system clock
//! into local "now" and local session times into UTC instants for the API.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Parse an IANA timezone name (e.g. "Asia/Hong_Kong").
///
/// # Errors
/// Returns `EngineError::InvalidTimezone` for unknown names.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// The current wall-clock time in `tz`.
pub fn local_now(tz: Tz) -> NaiveDateTime {
    to_local(Utc::now(), tz)
}

/// The wall-clock reading of `instant` in `tz`.
pub fn to_local(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Convert a local wall-clock time in `tz` to a UTC instant.
///
/// During a DST fold the earlier instant is used.
///
/// # Errors
/// Returns `EngineError::NonexistentLocalTime` when `local` falls in a DST gap.
pub fn to_utc(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            EngineError::NonexistentLocalTime(format!("{} in {}", local, tz.name()))
        })
}
