//! Error type for `cmdb-store-sqlite`.

use cmdb_core::Entity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  /// A foreign key named a row that does not exist.
  #[error("referenced {entity} {id} does not exist")]
  MissingReference { entity: Entity, id: i64 },

  /// A taxonomy row cannot be deleted while CIs point at it.
  #[error("{entity} {id} is still referenced by {dependents} CI(s)")]
  InUse { entity: Entity, id: i64, dependents: i64 },

  #[error("{entity} named {name:?} already exists")]
  DuplicateName { entity: Entity, name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for cmdb_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::MissingReference { entity, id } => {
        cmdb_core::Error::Reference { entity, id }
      }
      e @ (Error::InUse { .. } | Error::DuplicateName { .. }) => {
        cmdb_core::Error::Conflict(e.to_string())
      }
      other => cmdb_core::Error::StoreUnavailable(Box::new(other)),
    }
  }
}
