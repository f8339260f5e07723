//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for activation times, timer ends, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert unix seconds, as reported by the Pura cloud, into a [`Timestamp`].
///
/// Returns `None` when the value is out of chrono's representable range.
#[must_use]
pub fn from_unix(secs: i64) -> Option<Timestamp> {
    DateTime::from_timestamp(secs, 0)
}
