//! CI types and environments: the closed vocabularies a CI is classified
//! by.

use serde::{Deserialize, Serialize};

use crate::{Result, error::require};

// ─── CI types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiType {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
}

/// Input to create or fully replace a [`CiType`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCiType {
  /// Required. A missing key deserialises as empty and fails validation.
  #[serde(default)]
  pub name:        String,
  pub description: Option<String>,
}

impl NewCiType {
  pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
    Self {
      name:        name.into(),
      description: description.map(str::to_owned),
    }
  }

  pub fn validate(&self) -> Result<()> { require("name", &self.name) }
}

// ─── Environments ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
  pub id:   i64,
  pub name: String,
}

/// Input to create or fully replace an [`Environment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEnvironment {
  #[serde(default)]
  pub name: String,
}

impl NewEnvironment {
  pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }

  pub fn validate(&self) -> Result<()> { require("name", &self.name) }
}
