//! Wall-clock helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp, recorded when the home is written to storage.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
