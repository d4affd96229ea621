//! [`RegistryService`]: the orchestration layer over a [`CmdbStore`].
//!
//! Every externally reachable operation goes through here. The service
//! validates input, delegates to the store, and translates whatever the store
//! reports into the fixed [`Error`] taxonomy. Driver detail is logged, never
//! returned.

use serde::Deserialize;

use crate::{
  Entity, Error, Result,
  change::{CiChange, NewChange},
  ci::{CiPatch, CiSummary, ConfigurationItem, NewCi},
  relationship::{CiRelationship, NewRelationship, RelationshipLink},
  store::CmdbStore,
  taxonomy::{CiType, Environment, NewCiType, NewEnvironment},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Tunable registry behaviour, deserialised from the `[registry]` config
/// table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryPolicy {
  /// If `true`, a CI update with no fields fails with
  /// [`Error::Validation`]; otherwise the stored CI is returned unchanged.
  pub reject_empty_patch: bool,
}

impl Default for RegistryPolicy {
  fn default() -> Self { Self { reject_empty_patch: true } }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// The registry, generic over its store.
pub struct RegistryService<S> {
  store:  S,
  policy: RegistryPolicy,
}

/// Convert a backend error, logging the detail of infrastructure failures.
fn store_error<E: Into<Error>>(err: E) -> Error {
  let err = err.into();
  if let Error::StoreUnavailable(source) = &err {
    tracing::error!(error = %source, "store operation failed");
  }
  err
}

impl<S: CmdbStore> RegistryService<S> {
  pub fn new(store: S, policy: RegistryPolicy) -> Self { Self { store, policy } }

  pub fn store(&self) -> &S { &self.store }

  pub fn policy(&self) -> &RegistryPolicy { &self.policy }

  // ── CI types ──────────────────────────────────────────────────────────

  pub async fn list_ci_types(&self) -> Result<Vec<CiType>> {
    self.store.list_ci_types().await.map_err(store_error)
  }

  pub async fn get_ci_type(&self, id: i64) -> Result<CiType> {
    self
      .store
      .get_ci_type(id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::CiType, id))
  }

  pub async fn create_ci_type(&self, input: NewCiType) -> Result<CiType> {
    input.validate()?;
    let created = self.store.create_ci_type(input).await.map_err(store_error)?;
    tracing::debug!(id = created.id, name = %created.name, "created CI type");
    Ok(created)
  }

  pub async fn update_ci_type(&self, id: i64, input: NewCiType) -> Result<CiType> {
    input.validate()?;
    self
      .store
      .update_ci_type(id, input)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::CiType, id))
  }

  /// Fails with [`Error::Conflict`] while any CI is classified by this type.
  pub async fn delete_ci_type(&self, id: i64) -> Result<()> {
    if !self.store.delete_ci_type(id).await.map_err(store_error)? {
      return Err(Error::not_found(Entity::CiType, id));
    }
    tracing::debug!(id, "deleted CI type");
    Ok(())
  }

  // ── Environments ──────────────────────────────────────────────────────

  pub async fn list_environments(&self) -> Result<Vec<Environment>> {
    self.store.list_environments().await.map_err(store_error)
  }

  pub async fn get_environment(&self, id: i64) -> Result<Environment> {
    self
      .store
      .get_environment(id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::Environment, id))
  }

  pub async fn create_environment(&self, input: NewEnvironment) -> Result<Environment> {
    input.validate()?;
    let created = self
      .store
      .create_environment(input)
      .await
      .map_err(store_error)?;
    tracing::debug!(id = created.id, name = %created.name, "created environment");
    Ok(created)
  }

  pub async fn update_environment(
    &self,
    id: i64,
    input: NewEnvironment,
  ) -> Result<Environment> {
    input.validate()?;
    self
      .store
      .update_environment(id, input)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::Environment, id))
  }

  /// Fails with [`Error::Conflict`] while any CI is deployed in this
  /// environment.
  pub async fn delete_environment(&self, id: i64) -> Result<()> {
    if !self.store.delete_environment(id).await.map_err(store_error)? {
      return Err(Error::not_found(Entity::Environment, id));
    }
    tracing::debug!(id, "deleted environment");
    Ok(())
  }

  // ── Configuration items ───────────────────────────────────────────────

  pub async fn list_cis(&self) -> Result<Vec<CiSummary>> {
    self.store.list_cis().await.map_err(store_error)
  }

  pub async fn get_ci(&self, id: i64) -> Result<ConfigurationItem> {
    self
      .store
      .get_ci(id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::Ci, id))
  }

  /// Fails with [`Error::Reference`] if `type_id` or `environment_id` does
  /// not exist; no row is created in that case.
  pub async fn create_ci(&self, input: NewCi) -> Result<ConfigurationItem> {
    input.validate()?;
    let created = self.store.create_ci(input).await.map_err(store_error)?;
    tracing::debug!(id = created.id, name = %created.name, "created CI");
    Ok(created)
  }

  /// Apply a sparse patch. Only supplied fields change.
  pub async fn update_ci(&self, id: i64, patch: CiPatch) -> Result<ConfigurationItem> {
    patch.validate()?;
    if patch.is_empty() {
      if self.policy.reject_empty_patch {
        return Err(Error::Validation("update contains no fields".into()));
      }
      return self.get_ci(id).await;
    }

    let updated = self
      .store
      .update_ci(id, patch)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::Ci, id))?;
    tracing::debug!(id, "updated CI");
    Ok(updated)
  }

  /// Deletes the CI together with every relationship it takes part in. Its
  /// change history is kept.
  pub async fn delete_ci(&self, id: i64) -> Result<()> {
    if !self.store.delete_ci(id).await.map_err(store_error)? {
      return Err(Error::not_found(Entity::Ci, id));
    }
    tracing::debug!(id, "deleted CI");
    Ok(())
  }

  // ── Relationships ─────────────────────────────────────────────────────

  pub async fn list_relationships(&self, ci_id: i64) -> Result<Vec<RelationshipLink>> {
    self.store.list_relationships(ci_id).await.map_err(store_error)
  }

  /// Both endpoints must exist ([`Error::Reference`]); self-loops are a
  /// [`Error::Validation`] failure.
  pub async fn create_relationship(
    &self,
    ci_id: i64,
    input: NewRelationship,
  ) -> Result<CiRelationship> {
    input.validate(ci_id)?;
    let created = self
      .store
      .create_relationship(ci_id, input)
      .await
      .map_err(store_error)?;
    tracing::debug!(
      id = created.id,
      source = created.ci_id,
      target = created.related_ci_id,
      kind = %created.relationship_type,
      "created relationship"
    );
    Ok(created)
  }

  /// A `rel_id` that exists but belongs to another CI is reported as not
  /// found and left untouched.
  pub async fn delete_relationship(&self, ci_id: i64, rel_id: i64) -> Result<()> {
    if !self
      .store
      .delete_relationship(ci_id, rel_id)
      .await
      .map_err(store_error)?
    {
      return Err(Error::not_found(Entity::Relationship, rel_id));
    }
    tracing::debug!(ci_id, rel_id, "deleted relationship");
    Ok(())
  }

  // ── Change ledger ─────────────────────────────────────────────────────

  /// Unknown CIs yield an empty list rather than [`Error::NotFound`].
  pub async fn list_changes(&self, ci_id: i64) -> Result<Vec<CiChange>> {
    self.store.list_changes(ci_id).await.map_err(store_error)
  }

  pub async fn append_change(&self, ci_id: i64, input: NewChange) -> Result<CiChange> {
    input.validate()?;
    let created = self
      .store
      .append_change(ci_id, input)
      .await
      .map_err(store_error)?;
    tracing::debug!(id = created.id, ci_id, "appended change");
    Ok(created)
  }
}
