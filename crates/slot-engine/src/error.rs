//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid availability rule: {0}")]
    InvalidRule(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time does not exist in the portal timezone: {0}")]
    NonexistentLocalTime(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid booking: {0}")]
    InvalidBooking(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
