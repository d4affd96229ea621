//! Error types for `cmdb-core`.
//!
//! [`Error`] is the fixed taxonomy every registry operation fails with.
//! Backends convert their own errors into it; callers map it onto their
//! transport.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The kind of row an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
  CiType,
  Environment,
  Ci,
  Relationship,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::CiType => "CI type",
      Self::Environment => "environment",
      Self::Ci => "CI",
      Self::Relationship => "relationship",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// The addressed row does not exist (or, for relationships, is not owned
  /// by the addressed CI).
  #[error("{entity} {id} not found")]
  NotFound { entity: Entity, id: i64 },

  #[error("validation failed: {0}")]
  Validation(String),

  /// A foreign key in the request points at a row that does not exist.
  #[error("referenced {entity} {id} does not exist")]
  Reference { entity: Entity, id: i64 },

  #[error("conflict: {0}")]
  Conflict(String),

  /// The backend failed. The source carries driver detail for logs only.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: Entity, id: i64) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject a required text field that is empty or whitespace.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("field `{field}` is required")));
  }
  Ok(())
}
