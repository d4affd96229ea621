//! The change ledger: an append-only audit trail per CI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, error::require};

/// One audit entry. Never updated or deleted once written, and kept when its
/// CI is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiChange {
  pub id:                 i64,
  pub ci_id:              i64,
  pub change_date:        DateTime<Utc>,
  pub change_description: String,
}

/// Input to [`crate::store::CmdbStore::append_change`].
///
/// `change_date` accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD`, read
/// as midnight UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChange {
  #[serde(deserialize_with = "crate::date::timestamp")]
  pub change_date:        DateTime<Utc>,
  #[serde(default)]
  pub change_description: String,
}

impl NewChange {
  pub fn new(change_date: DateTime<Utc>, change_description: impl Into<String>) -> Self {
    Self { change_date, change_description: change_description.into() }
  }

  pub fn validate(&self) -> Result<()> {
    require("change_description", &self.change_description)
  }
}
