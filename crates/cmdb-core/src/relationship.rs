//! Directed, typed edges between configuration items.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, error::require};

/// An edge `ci_id → related_ci_id`, owned by its source CI.
///
/// Duplicate edges (same endpoints and type) are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiRelationship {
  pub id:                i64,
  /// The source CI.
  pub ci_id:             i64,
  /// The target CI.
  pub related_ci_id:     i64,
  /// Free-text edge label, e.g. "depends_on", "hosted_on".
  pub relationship_type: String,
}

/// Listing row for the edges leaving one CI. The source is implied by the
/// query and not repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLink {
  pub id:                i64,
  pub related_ci_id:     i64,
  pub relationship_type: String,
}

impl From<CiRelationship> for RelationshipLink {
  fn from(rel: CiRelationship) -> Self {
    Self {
      id:                rel.id,
      related_ci_id:     rel.related_ci_id,
      relationship_type: rel.relationship_type,
    }
  }
}

/// Input to [`crate::store::CmdbStore::create_relationship`]. The source CI
/// is addressed separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelationship {
  pub related_ci_id:     i64,
  #[serde(default)]
  pub relationship_type: String,
}

impl NewRelationship {
  pub fn new(related_ci_id: i64, relationship_type: impl Into<String>) -> Self {
    Self { related_ci_id, relationship_type: relationship_type.into() }
  }

  /// Self-loops are rejected.
  pub fn validate(&self, ci_id: i64) -> Result<()> {
    require("relationship_type", &self.relationship_type)?;
    if self.related_ci_id == ci_id {
      return Err(Error::Validation(format!(
        "CI {ci_id} cannot be related to itself"
      )));
    }
    Ok(())
  }
}
