//! Server timestamps
//!
//! The backend writes ISO 8601 datetimes, sometimes without an offset. Naive values are local
//! Mozambique time (CAT, UTC+2).

use jiff::{
    Timestamp,
    civil::DateTime,
    tz::{self, Offset, TimeZone},
};
use serde::{Deserialize, Deserializer, Serializer, de};

/// Offset the backend uses for naive datetimes.
pub const SERVER_OFFSET: Offset = tz::offset(2);

/// Parse a server datetime into an absolute timestamp.
///
/// # Errors
///
/// Returns an error when the value is neither an RFC 3339 timestamp nor a civil datetime.
pub fn parse_server_time(raw: &str) -> Result<Timestamp, jiff::Error> {
    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    let civil: DateTime = raw.parse()?;

    Ok(civil.to_zoned(TimeZone::fixed(SERVER_OFFSET))?.timestamp())
}

/// `#[serde(with = "server_time")]` for [`Timestamp`] fields.
pub mod server_time {
    use super::{Deserialize, Deserializer, Serializer, Timestamp, de, parse_server_time};

    /// # Errors
    ///
    /// Returns an error when the value is not a recognised datetime.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;

        parse_server_time(&raw).map_err(de::Error::custom)
    }

    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(timestamp)
    }
}
