//! Wire format for instants stored in day files and exchanged with the tracker.
//!
//! Instants are written as UTC with microsecond precision and an explicit
//! offset (`2024-12-06T14:30:00.123456+00:00`). Reading accepts any RFC 3339
//! offset, including `Z` and zoned variants.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

pub const PRECISION_DIGITS: u16 = 6;

pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|dt| dt.with_timezone(&Utc))
}

/// Drops anything finer than the wire precision so a write/read round trip is exact.
pub fn truncate(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(PRECISION_DIGITS)
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|err| de::Error::custom(format!("invalid timestamp '{raw}': {err}")))
}
