//! Wall-clock helpers for record timestamps.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Current Unix timestamp in seconds
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Current UTC time as RFC 3339 with second precision, e.g. `2024-05-01T09:30:00Z`
pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a timestamp written by [`now_utc_string`]
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Format(format!("Invalid UTC timestamp {:?}: {}", text, e)))
}
