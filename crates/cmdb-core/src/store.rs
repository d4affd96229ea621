//! The `CmdbStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `cmdb-store-sqlite`).
//! [`crate::service::RegistryService`] is constructed with a store and
//! depends only on this abstraction, so tests can substitute any backend.

use std::future::Future;

use crate::{
  change::{CiChange, NewChange},
  ci::{CiPatch, CiSummary, ConfigurationItem, NewCi},
  relationship::{CiRelationship, NewRelationship, RelationshipLink},
  taxonomy::{CiType, Environment, NewCiType, NewEnvironment},
};

/// Abstraction over a CMDB storage backend.
///
/// Lookups return `None` (or `false` for deletes) when the addressed row does
/// not exist. Referential rules are the backend's responsibility and must be
/// checked in the same atomic unit as the write they guard:
///
/// - writes that carry a foreign key fail with an error converting to
///   [`crate::Error::Reference`] when the referenced row is absent, and
///   leave no row behind;
/// - deleting a CI type or environment still referenced by a CI fails with an
///   error converting to [`crate::Error::Conflict`];
/// - deleting a CI also removes every relationship it is an endpoint of;
///   change entries are kept.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CmdbStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── CI types ──────────────────────────────────────────────────────────

  /// All CI types, ordered by id.
  fn list_ci_types(
    &self,
  ) -> impl Future<Output = Result<Vec<CiType>, Self::Error>> + Send + '_;

  fn get_ci_type(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CiType>, Self::Error>> + Send + '_;

  /// Fails with a conflict if another type already has this name.
  fn create_ci_type(
    &self,
    input: NewCiType,
  ) -> impl Future<Output = Result<CiType, Self::Error>> + Send + '_;

  /// Full replace of name and description.
  fn update_ci_type(
    &self,
    id: i64,
    input: NewCiType,
  ) -> impl Future<Output = Result<Option<CiType>, Self::Error>> + Send + '_;

  fn delete_ci_type(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Environments ──────────────────────────────────────────────────────

  /// All environments, ordered by id.
  fn list_environments(
    &self,
  ) -> impl Future<Output = Result<Vec<Environment>, Self::Error>> + Send + '_;

  fn get_environment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Environment>, Self::Error>> + Send + '_;

  fn create_environment(
    &self,
    input: NewEnvironment,
  ) -> impl Future<Output = Result<Environment, Self::Error>> + Send + '_;

  fn update_environment(
    &self,
    id: i64,
    input: NewEnvironment,
  ) -> impl Future<Output = Result<Option<Environment>, Self::Error>> + Send + '_;

  fn delete_environment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Configuration items ───────────────────────────────────────────────

  /// All CIs joined with their type and environment names, ordered by id.
  fn list_cis(
    &self,
  ) -> impl Future<Output = Result<Vec<CiSummary>, Self::Error>> + Send + '_;

  fn get_ci(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ConfigurationItem>, Self::Error>> + Send + '_;

  fn create_ci(
    &self,
    input: NewCi,
  ) -> impl Future<Output = Result<ConfigurationItem, Self::Error>> + Send + '_;

  /// Apply a sparse patch and return the merged row. An empty patch returns
  /// the row unchanged.
  fn update_ci(
    &self,
    id: i64,
    patch: CiPatch,
  ) -> impl Future<Output = Result<Option<ConfigurationItem>, Self::Error>> + Send + '_;

  fn delete_ci(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Relationships ─────────────────────────────────────────────────────

  /// Edges whose source is `ci_id`, ordered by id. Unknown CIs yield an
  /// empty list.
  fn list_relationships(
    &self,
    ci_id: i64,
  ) -> impl Future<Output = Result<Vec<RelationshipLink>, Self::Error>> + Send + '_;

  /// Both endpoints must exist.
  fn create_relationship(
    &self,
    ci_id: i64,
    input: NewRelationship,
  ) -> impl Future<Output = Result<CiRelationship, Self::Error>> + Send + '_;

  /// Deletes edge `rel_id` only if its source is `ci_id`.
  fn delete_relationship(
    &self,
    ci_id: i64,
    rel_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Change ledger ─────────────────────────────────────────────────────

  /// Entries for `ci_id` ordered by `change_date` ascending, then by id.
  fn list_changes(
    &self,
    ci_id: i64,
  ) -> impl Future<Output = Result<Vec<CiChange>, Self::Error>> + Send + '_;

  /// The CI must exist at the time of the append.
  fn append_change(
    &self,
    ci_id: i64,
    input: NewChange,
  ) -> impl Future<Output = Result<CiChange, Self::Error>> + Send + '_;
}
