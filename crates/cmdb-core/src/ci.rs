//! Configuration items, the tracked assets themselves, and the sparse patch
//! used to modify them.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Result,
  date::{nullable_date, optional_date},
  error::require,
};

// ─── Stored shape ────────────────────────────────────────────────────────────

/// A configuration item as stored. `type_id` and `environment_id` point into
/// the taxonomy tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationItem {
  pub id:                      i64,
  pub name:                    String,
  pub type_id:                 i64,
  pub environment_id:          i64,
  pub description:             Option<String>,
  pub serial_number:           Option<String>,
  pub version:                 Option<String>,
  pub acquisition_date:        Option<NaiveDate>,
  /// Free-form lifecycle label, e.g. "Activo".
  pub status:                  Option<String>,
  pub location:                Option<String>,
  pub owner:                   Option<String>,
  pub documentation_url:       Option<String>,
  pub incident_url:            Option<String>,
  /// Free-form classification label, e.g. "Medio".
  pub security_level:          Option<String>,
  pub compliance:              Option<String>,
  pub config_state:            Option<String>,
  pub license_number:          Option<String>,
  pub license_expiration_date: Option<NaiveDate>,
}

/// Listing row: a CI joined with the names of its type and environment.
/// Read-only; never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiSummary {
  #[serde(flatten)]
  pub ci:               ConfigurationItem,
  #[serde(rename = "type")]
  pub type_name:        String,
  #[serde(rename = "environment")]
  pub environment_name: String,
}

// ─── NewCi ───────────────────────────────────────────────────────────────────

/// Input to [`crate::store::CmdbStore::create_ci`]. The id is always assigned
/// by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCi {
  #[serde(default)]
  pub name:                    String,
  pub type_id:                 i64,
  pub environment_id:          i64,
  pub description:             Option<String>,
  pub serial_number:           Option<String>,
  pub version:                 Option<String>,
  #[serde(default, deserialize_with = "optional_date")]
  pub acquisition_date:        Option<NaiveDate>,
  pub status:                  Option<String>,
  pub location:                Option<String>,
  pub owner:                   Option<String>,
  pub documentation_url:       Option<String>,
  pub incident_url:            Option<String>,
  pub security_level:          Option<String>,
  pub compliance:              Option<String>,
  pub config_state:            Option<String>,
  pub license_number:          Option<String>,
  #[serde(default, deserialize_with = "optional_date")]
  pub license_expiration_date: Option<NaiveDate>,
}

impl NewCi {
  /// Convenience constructor with every optional attribute unset.
  pub fn new(name: impl Into<String>, type_id: i64, environment_id: i64) -> Self {
    Self {
      name: name.into(),
      type_id,
      environment_id,
      ..Default::default()
    }
  }

  pub fn validate(&self) -> Result<()> { require("name", &self.name) }

  /// The stored item this input becomes once the store has assigned `id`.
  pub fn into_item(self, id: i64) -> ConfigurationItem {
    ConfigurationItem {
      id,
      name: self.name,
      type_id: self.type_id,
      environment_id: self.environment_id,
      description: self.description,
      serial_number: self.serial_number,
      version: self.version,
      acquisition_date: self.acquisition_date,
      status: self.status,
      location: self.location,
      owner: self.owner,
      documentation_url: self.documentation_url,
      incident_url: self.incident_url,
      security_level: self.security_level,
      compliance: self.compliance,
      config_state: self.config_state,
      license_number: self.license_number,
      license_expiration_date: self.license_expiration_date,
    }
  }
}

// ─── Sparse patch ────────────────────────────────────────────────────────────

/// A patchable CI attribute. The name doubles as the column name in backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CiField {
  Name,
  TypeId,
  EnvironmentId,
  Description,
  SerialNumber,
  Version,
  AcquisitionDate,
  Status,
  Location,
  Owner,
  DocumentationUrl,
  IncidentUrl,
  SecurityLevel,
  Compliance,
  ConfigState,
  LicenseNumber,
  LicenseExpirationDate,
}

impl CiField {
  pub fn name(self) -> &'static str {
    match self {
      Self::Name => "name",
      Self::TypeId => "type_id",
      Self::EnvironmentId => "environment_id",
      Self::Description => "description",
      Self::SerialNumber => "serial_number",
      Self::Version => "version",
      Self::AcquisitionDate => "acquisition_date",
      Self::Status => "status",
      Self::Location => "location",
      Self::Owner => "owner",
      Self::DocumentationUrl => "documentation_url",
      Self::IncidentUrl => "incident_url",
      Self::SecurityLevel => "security_level",
      Self::Compliance => "compliance",
      Self::ConfigState => "config_state",
      Self::LicenseNumber => "license_number",
      Self::LicenseExpirationDate => "license_expiration_date",
    }
  }
}

/// The new value carried by one [`FieldChange`]. `None` clears the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
  Text(Option<String>),
  Id(i64),
  Date(Option<NaiveDate>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
  pub field: CiField,
  pub value: FieldValue,
}

/// A sparse update: every slot left `None` keeps its stored value.
///
/// For nullable attributes the inner `Option` distinguishes "set to null"
/// (`Some(None)`, sent as JSON `null`) from "not supplied" (`None`, key
/// absent). Unknown keys are rejected during deserialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CiPatch {
  pub name:                    Option<String>,
  pub type_id:                 Option<i64>,
  pub environment_id:          Option<i64>,
  #[serde(default, deserialize_with = "nullable")]
  pub description:             Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub serial_number:           Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub version:                 Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable_date")]
  pub acquisition_date:        Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub status:                  Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub location:                Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub owner:                   Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub documentation_url:       Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub incident_url:            Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub security_level:          Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub compliance:              Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub config_state:            Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub license_number:          Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable_date")]
  pub license_expiration_date: Option<Option<NaiveDate>>,
}

/// A present key always yields `Some`, even when its value is `null`.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

impl CiPatch {
  /// The supplied fields, in schema order.
  pub fn changes(&self) -> Vec<FieldChange> {
    let mut out = Vec::new();

    if let Some(name) = &self.name {
      out.push(FieldChange {
        field: CiField::Name,
        value: FieldValue::Text(Some(name.clone())),
      });
    }
    for (field, id) in [
      (CiField::TypeId, self.type_id),
      (CiField::EnvironmentId, self.environment_id),
    ] {
      if let Some(id) = id {
        out.push(FieldChange { field, value: FieldValue::Id(id) });
      }
    }

    let text = [
      (CiField::Description, &self.description),
      (CiField::SerialNumber, &self.serial_number),
      (CiField::Version, &self.version),
      (CiField::Status, &self.status),
      (CiField::Location, &self.location),
      (CiField::Owner, &self.owner),
      (CiField::DocumentationUrl, &self.documentation_url),
      (CiField::IncidentUrl, &self.incident_url),
      (CiField::SecurityLevel, &self.security_level),
      (CiField::Compliance, &self.compliance),
      (CiField::ConfigState, &self.config_state),
      (CiField::LicenseNumber, &self.license_number),
    ];
    for (field, slot) in text {
      if let Some(value) = slot {
        out.push(FieldChange { field, value: FieldValue::Text(value.clone()) });
      }
    }

    for (field, slot) in [
      (CiField::AcquisitionDate, self.acquisition_date),
      (CiField::LicenseExpirationDate, self.license_expiration_date),
    ] {
      if let Some(value) = slot {
        out.push(FieldChange { field, value: FieldValue::Date(value) });
      }
    }

    out
  }

  pub fn is_empty(&self) -> bool { self.changes().is_empty() }

  pub fn validate(&self) -> Result<()> {
    match &self.name {
      Some(name) => require("name", name),
      None => Ok(()),
    }
  }
}
