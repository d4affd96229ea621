//! Lenient parsing for the date-valued fields clients send.
//!
//! Calendar fields accept `YYYY-MM-DD` or a full RFC 3339 timestamp (only the
//! date is kept); an empty string counts as "no date". Change timestamps
//! accept RFC 3339 or a bare date, which is read as midnight UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date. Blank input is `None`.
pub fn parse_date(s: &str) -> Result<Option<NaiveDate>, String> {
  let s = s.trim();
  if s.is_empty() {
    return Ok(None);
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .or_else(|_| DateTime::parse_from_rfc3339(s).map(|t| t.date_naive()))
    .map(Some)
    .map_err(|_| format!("{s:?} is not a date (expected YYYY-MM-DD)"))
}

/// Parse a point in time, normalised to UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
  let s = s.trim();
  if let Ok(t) = DateTime::parse_from_rfc3339(s) {
    return Ok(t.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|t| t.and_utc())
    .ok_or_else(|| format!("{s:?} is not a timestamp (expected RFC 3339 or YYYY-MM-DD)"))
}

// ─── serde helpers ───────────────────────────────────────────────────────────

/// `null`, `""` or a missing key yield `None`.
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(deserializer)? {
    Some(s) => parse_date(&s).map_err(D::Error::custom),
    None => Ok(None),
  }
}

/// Patch slot: a present key always yields `Some`; `null` and `""` clear.
pub(crate) fn nullable_date<'de, D>(
  deserializer: D,
) -> Result<Option<Option<NaiveDate>>, D::Error>
where
  D: Deserializer<'de>,
{
  optional_date(deserializer).map(Some)
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  parse_timestamp(&s).map_err(D::Error::custom)
}
