//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC instant used for event bounds.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an RFC 3339 string as stored by the persistence adapters.
///
/// # Errors
///
/// Returns [`chrono::ParseError`] when `value` is not RFC 3339.
pub fn parse_rfc3339(value: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.to_utc())
}
