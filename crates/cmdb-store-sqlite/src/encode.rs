//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD` text and change timestamps as
//! fixed-width RFC 3339 UTC text, so that lexical order matches chronological
//! order. Everything else maps onto native SQLite integers and text.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use cmdb_core::{
  change::CiChange,
  ci::{CiSummary, ConfigurationItem, FieldValue, NewCi},
};
use rusqlite::{Row, types::Value};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Always microsecond precision with a `Z` suffix, e.g.
/// `2025-06-22T12:00:00.000000Z`.
pub fn encode_timestamp(t: DateTime<Utc>) -> String {
  t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_timestamp(s: &str) -> Result<DateTime<Utc>> {
  cmdb_core::date::parse_timestamp(s).map_err(Error::DateParse)
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Column values ───────────────────────────────────────────────────────────

fn text(v: &Option<String>) -> Value { v.clone().map_or(Value::Null, Value::Text) }

fn date(v: Option<NaiveDate>) -> Value {
  v.map_or(Value::Null, |d| Value::Text(encode_date(d)))
}

/// The SQL value for one patched field.
pub fn field_value(v: FieldValue) -> Value {
  match v {
    FieldValue::Text(t) => t.map_or(Value::Null, Value::Text),
    FieldValue::Id(id) => Value::Integer(id),
    FieldValue::Date(d) => date(d),
  }
}

/// Values for every `cis` column except `id`, in [`CI_COLUMNS`] order.
pub fn ci_values(ci: &NewCi) -> Vec<Value> {
  vec![
    Value::Text(ci.name.clone()),
    Value::Integer(ci.type_id),
    Value::Integer(ci.environment_id),
    text(&ci.description),
    text(&ci.serial_number),
    text(&ci.version),
    date(ci.acquisition_date),
    text(&ci.status),
    text(&ci.location),
    text(&ci.owner),
    text(&ci.documentation_url),
    text(&ci.incident_url),
    text(&ci.security_level),
    text(&ci.compliance),
    text(&ci.config_state),
    text(&ci.license_number),
    date(ci.license_expiration_date),
  ]
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `cis` read, `id` first.
pub const CI_COLUMNS: &str = "id, name, type_id, environment_id, description,
  serial_number, version, acquisition_date, status, location, owner,
  documentation_url, incident_url, security_level, compliance, config_state,
  license_number, license_expiration_date";

/// Raw values read directly from a `cis` row, dates still encoded.
pub struct RawCi {
  pub id:                      i64,
  pub name:                    String,
  pub type_id:                 i64,
  pub environment_id:          i64,
  pub description:             Option<String>,
  pub serial_number:           Option<String>,
  pub version:                 Option<String>,
  pub acquisition_date:        Option<String>,
  pub status:                  Option<String>,
  pub location:                Option<String>,
  pub owner:                   Option<String>,
  pub documentation_url:       Option<String>,
  pub incident_url:            Option<String>,
  pub security_level:          Option<String>,
  pub compliance:              Option<String>,
  pub config_state:            Option<String>,
  pub license_number:          Option<String>,
  pub license_expiration_date: Option<String>,
}

impl RawCi {
  /// Read the first eighteen columns of `row`, laid out as [`CI_COLUMNS`].
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                      row.get(0)?,
      name:                    row.get(1)?,
      type_id:                 row.get(2)?,
      environment_id:          row.get(3)?,
      description:             row.get(4)?,
      serial_number:           row.get(5)?,
      version:                 row.get(6)?,
      acquisition_date:        row.get(7)?,
      status:                  row.get(8)?,
      location:                row.get(9)?,
      owner:                   row.get(10)?,
      documentation_url:       row.get(11)?,
      incident_url:            row.get(12)?,
      security_level:          row.get(13)?,
      compliance:              row.get(14)?,
      config_state:            row.get(15)?,
      license_number:          row.get(16)?,
      license_expiration_date: row.get(17)?,
    })
  }

  pub fn into_item(self) -> Result<ConfigurationItem> {
    Ok(ConfigurationItem {
      id:                      self.id,
      name:                    self.name,
      type_id:                 self.type_id,
      environment_id:          self.environment_id,
      description:             self.description,
      serial_number:           self.serial_number,
      version:                 self.version,
      acquisition_date:        decode_opt_date(self.acquisition_date)?,
      status:                  self.status,
      location:                self.location,
      owner:                   self.owner,
      documentation_url:       self.documentation_url,
      incident_url:            self.incident_url,
      security_level:          self.security_level,
      compliance:              self.compliance,
      config_state:            self.config_state,
      license_number:          self.license_number,
      license_expiration_date: decode_opt_date(self.license_expiration_date)?,
    })
  }
}

/// A `cis` row joined with its type and environment names.
pub struct RawCiSummary {
  pub ci:               RawCi,
  pub type_name:        String,
  pub environment_name: String,
}

impl RawCiSummary {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ci:               RawCi::read(row)?,
      type_name:        row.get(18)?,
      environment_name: row.get(19)?,
    })
  }

  pub fn into_summary(self) -> Result<CiSummary> {
    Ok(CiSummary {
      ci:               self.ci.into_item()?,
      type_name:        self.type_name,
      environment_name: self.environment_name,
    })
  }
}

/// Raw values read directly from a `ci_changes` row.
pub struct RawChange {
  pub id:                 i64,
  pub ci_id:              i64,
  pub change_date:        String,
  pub change_description: String,
}

impl RawChange {
  pub fn into_change(self) -> Result<CiChange> {
    Ok(CiChange {
      id:                 self.id,
      ci_id:              self.ci_id,
      change_date:        decode_timestamp(&self.change_date)?,
      change_description: self.change_description,
    })
  }
}
