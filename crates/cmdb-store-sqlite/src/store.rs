//! [`SqliteStore`]: the SQLite implementation of [`CmdbStore`].
//!
//! Every write that depends on another row runs its check and its write in
//! one transaction inside a single `call`, so concurrent requests cannot
//! interleave between them. Domain violations found inside a transaction are
//! returned as the inner `Err` of a nested result; the transaction is dropped
//! and rolled back.

use std::path::Path;

use cmdb_core::{
  Entity,
  change::{CiChange, NewChange},
  ci::{CiPatch, CiSummary, ConfigurationItem, NewCi},
  relationship::{CiRelationship, NewRelationship, RelationshipLink},
  store::CmdbStore,
  taxonomy::{CiType, Environment, NewCiType, NewEnvironment},
};
use rusqlite::{Connection, OptionalExtension as _, types::Value};

use crate::{
  Error, Result,
  encode::{
    CI_COLUMNS, RawChange, RawCi, RawCiSummary, ci_values, encode_timestamp,
    field_value,
  },
  schema::SCHEMA,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Outcome of a transaction that may hit a domain violation.
type Checked<T> = std::result::Result<T, Error>;

fn table(entity: Entity) -> &'static str {
  match entity {
    Entity::CiType => "ci_types",
    Entity::Environment => "environments",
    Entity::Ci => "cis",
    Entity::Relationship => "ci_relationships",
  }
}

fn exists(conn: &Connection, entity: Entity, id: i64) -> rusqlite::Result<bool> {
  let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table(entity));
  Ok(conn.query_row(&sql, [id], |_| Ok(())).optional()?.is_some())
}

/// The first of `refs` that does not exist, as a violation.
fn first_missing(
  conn: &Connection,
  refs: &[(Entity, i64)],
) -> rusqlite::Result<Option<Error>> {
  for &(entity, id) in refs {
    if !exists(conn, entity, id)? {
      return Ok(Some(Error::MissingReference { entity, id }));
    }
  }
  Ok(None)
}

/// Whether a taxonomy row other than `except` already uses `name`.
fn name_taken(
  conn: &Connection,
  entity: Entity,
  name: &str,
  except: Option<i64>,
) -> rusqlite::Result<bool> {
  let sql = format!(
    "SELECT 1 FROM {} WHERE name = ?1 AND id IS NOT ?2",
    table(entity)
  );
  Ok(
    conn
      .query_row(&sql, rusqlite::params![name, except], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// Delete a taxonomy row unless a CI still references it through `column`.
fn delete_taxonomy_row(
  conn: &mut Connection,
  entity: Entity,
  column: &str,
  id: i64,
) -> rusqlite::Result<Checked<bool>> {
  let tx = conn.transaction()?;

  let dependents: i64 = tx.query_row(
    &format!("SELECT COUNT(*) FROM cis WHERE {column} = ?1"),
    [id],
    |r| r.get(0),
  )?;
  if dependents > 0 {
    return Ok(Err(Error::InUse { entity, id, dependents }));
  }

  let deleted = tx.execute(
    &format!("DELETE FROM {} WHERE id = ?1", table(entity)),
    [id],
  )?;
  tx.commit()?;
  Ok(Ok(deleted > 0))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CMDB store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CmdbStore impl ──────────────────────────────────────────────────────────

impl CmdbStore for SqliteStore {
  type Error = Error;

  // ── CI types ──────────────────────────────────────────────────────────────

  async fn list_ci_types(&self) -> Result<Vec<CiType>> {
    let types = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, name, description FROM ci_types ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(CiType {
              id:          row.get(0)?,
              name:        row.get(1)?,
              description: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(types)
  }

  async fn get_ci_type(&self, id: i64) -> Result<Option<CiType>> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, name, description FROM ci_types WHERE id = ?1",
            [id],
            |row| {
              Ok(CiType {
                id:          row.get(0)?,
                name:        row.get(1)?,
                description: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(found)
  }

  async fn create_ci_type(&self, input: NewCiType) -> Result<CiType> {
    let NewCiType { name, description } = input;

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if name_taken(&tx, Entity::CiType, &name, None)? {
          return Ok(Err(Error::DuplicateName { entity: Entity::CiType, name }));
        }
        tx.execute(
          "INSERT INTO ci_types (name, description) VALUES (?1, ?2)",
          rusqlite::params![name, description],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(CiType { id, name, description }))
      })
      .await??;
    Ok(created)
  }

  async fn update_ci_type(&self, id: i64, input: NewCiType) -> Result<Option<CiType>> {
    let NewCiType { name, description } = input;

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, Entity::CiType, id)? {
          return Ok(Ok(None));
        }
        if name_taken(&tx, Entity::CiType, &name, Some(id))? {
          return Ok(Err(Error::DuplicateName { entity: Entity::CiType, name }));
        }
        tx.execute(
          "UPDATE ci_types SET name = ?1, description = ?2 WHERE id = ?3",
          rusqlite::params![name, description, id],
        )?;
        tx.commit()?;
        Ok(Ok(Some(CiType { id, name, description })))
      })
      .await??;
    Ok(updated)
  }

  async fn delete_ci_type(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| Ok(delete_taxonomy_row(conn, Entity::CiType, "type_id", id)?))
      .await??;
    Ok(deleted)
  }

  // ── Environments ──────────────────────────────────────────────────────────

  async fn list_environments(&self) -> Result<Vec<Environment>> {
    let envs = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM environments ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| Ok(Environment { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(envs)
  }

  async fn get_environment(&self, id: i64) -> Result<Option<Environment>> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, name FROM environments WHERE id = ?1",
            [id],
            |row| Ok(Environment { id: row.get(0)?, name: row.get(1)? }),
          )
          .optional()?)
      })
      .await?;
    Ok(found)
  }

  async fn create_environment(&self, input: NewEnvironment) -> Result<Environment> {
    let NewEnvironment { name } = input;

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if name_taken(&tx, Entity::Environment, &name, None)? {
          return Ok(Err(Error::DuplicateName { entity: Entity::Environment, name }));
        }
        tx.execute("INSERT INTO environments (name) VALUES (?1)", [&name])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(Environment { id, name }))
      })
      .await??;
    Ok(created)
  }

  async fn update_environment(
    &self,
    id: i64,
    input: NewEnvironment,
  ) -> Result<Option<Environment>> {
    let NewEnvironment { name } = input;

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, Entity::Environment, id)? {
          return Ok(Ok(None));
        }
        if name_taken(&tx, Entity::Environment, &name, Some(id))? {
          return Ok(Err(Error::DuplicateName { entity: Entity::Environment, name }));
        }
        tx.execute(
          "UPDATE environments SET name = ?1 WHERE id = ?2",
          rusqlite::params![name, id],
        )?;
        tx.commit()?;
        Ok(Ok(Some(Environment { id, name })))
      })
      .await??;
    Ok(updated)
  }

  async fn delete_environment(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(delete_taxonomy_row(conn, Entity::Environment, "environment_id", id)?)
      })
      .await??;
    Ok(deleted)
  }

  // ── Configuration items ───────────────────────────────────────────────────

  async fn list_cis(&self) -> Result<Vec<CiSummary>> {
    let raws: Vec<RawCiSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT
             c.id, c.name, c.type_id, c.environment_id, c.description,
             c.serial_number, c.version, c.acquisition_date, c.status,
             c.location, c.owner, c.documentation_url, c.incident_url,
             c.security_level, c.compliance, c.config_state,
             c.license_number, c.license_expiration_date,
             t.name AS type,
             e.name AS environment
           FROM cis c
           JOIN ci_types     t ON c.type_id        = t.id
           JOIN environments e ON c.environment_id = e.id
           ORDER BY c.id",
        )?;
        let rows = stmt
          .query_map([], RawCiSummary::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCiSummary::into_summary).collect()
  }

  async fn get_ci(&self, id: i64) -> Result<Option<ConfigurationItem>> {
    let raw: Option<RawCi> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CI_COLUMNS} FROM cis WHERE id = ?1"),
            [id],
            RawCi::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCi::into_item).transpose()
  }

  async fn create_ci(&self, input: NewCi) -> Result<ConfigurationItem> {
    let refs = [
      (Entity::CiType, input.type_id),
      (Entity::Environment, input.environment_id),
    ];
    let values = ci_values(&input);

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(violation) = first_missing(&tx, &refs)? {
          return Ok(Err(violation));
        }
        tx.execute(
          "INSERT INTO cis
             (name, type_id, environment_id, description, serial_number,
              version, acquisition_date, status, location, owner,
              documentation_url, incident_url, security_level, compliance,
              config_state, license_number, license_expiration_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
          rusqlite::params_from_iter(values),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await??;

    Ok(input.into_item(id))
  }

  async fn update_ci(&self, id: i64, patch: CiPatch) -> Result<Option<ConfigurationItem>> {
    let refs: Vec<(Entity, i64)> = [
      patch.type_id.map(|t| (Entity::CiType, t)),
      patch.environment_id.map(|e| (Entity::Environment, e)),
    ]
    .into_iter()
    .flatten()
    .collect();

    // Column names come from the fixed `CiField` set, never from input.
    let changes = patch.changes();
    let assignments: Vec<String> = changes
      .iter()
      .enumerate()
      .map(|(i, c)| format!("{} = ?{}", c.field.name(), i + 1))
      .collect();
    let mut values: Vec<Value> =
      changes.into_iter().map(|c| field_value(c.value)).collect();
    values.push(Value::Integer(id));
    let update_sql = format!(
      "UPDATE cis SET {} WHERE id = ?{}",
      assignments.join(", "),
      values.len()
    );

    let raw: Option<RawCi> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, Entity::Ci, id)? {
          return Ok(Ok(None));
        }
        if let Some(violation) = first_missing(&tx, &refs)? {
          return Ok(Err(violation));
        }
        if !assignments.is_empty() {
          tx.execute(&update_sql, rusqlite::params_from_iter(values))?;
        }
        let raw = tx.query_row(
          &format!("SELECT {CI_COLUMNS} FROM cis WHERE id = ?1"),
          [id],
          RawCi::read,
        )?;
        tx.commit()?;
        Ok(Ok(Some(raw)))
      })
      .await??;

    raw.map(RawCi::into_item).transpose()
  }

  async fn delete_ci(&self, id: i64) -> Result<bool> {
    // Relationships on either end go with it via ON DELETE CASCADE.
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM cis WHERE id = ?1", [id])?))
      .await?;
    Ok(deleted > 0)
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  async fn list_relationships(&self, ci_id: i64) -> Result<Vec<RelationshipLink>> {
    let rels = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, related_ci_id, relationship_type
           FROM ci_relationships WHERE ci_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map([ci_id], |row| {
            Ok(RelationshipLink {
              id:                row.get(0)?,
              related_ci_id:     row.get(1)?,
              relationship_type: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rels)
  }

  async fn create_relationship(
    &self,
    ci_id: i64,
    input: NewRelationship,
  ) -> Result<CiRelationship> {
    let NewRelationship { related_ci_id, relationship_type } = input;
    let refs = [(Entity::Ci, ci_id), (Entity::Ci, related_ci_id)];

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(violation) = first_missing(&tx, &refs)? {
          return Ok(Err(violation));
        }
        tx.execute(
          "INSERT INTO ci_relationships (ci_id, related_ci_id, relationship_type)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![ci_id, related_ci_id, relationship_type],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(CiRelationship { id, ci_id, related_ci_id, relationship_type }))
      })
      .await??;
    Ok(created)
  }

  async fn delete_relationship(&self, ci_id: i64, rel_id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM ci_relationships WHERE id = ?1 AND ci_id = ?2",
          [rel_id, ci_id],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Change ledger ─────────────────────────────────────────────────────────

  async fn list_changes(&self, ci_id: i64) -> Result<Vec<CiChange>> {
    let raws: Vec<RawChange> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, ci_id, change_date, change_description
           FROM ci_changes WHERE ci_id = ?1 ORDER BY change_date, id",
        )?;
        let rows = stmt
          .query_map([ci_id], |row| {
            Ok(RawChange {
              id:                 row.get(0)?,
              ci_id:              row.get(1)?,
              change_date:        row.get(2)?,
              change_description: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChange::into_change).collect()
  }

  async fn append_change(&self, ci_id: i64, input: NewChange) -> Result<CiChange> {
    let date_str    = encode_timestamp(input.change_date);
    let description = input.change_description.clone();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(violation) = first_missing(&tx, &[(Entity::Ci, ci_id)])? {
          return Ok(Err(violation));
        }
        tx.execute(
          "INSERT INTO ci_changes (ci_id, change_date, change_description)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![ci_id, date_str, description],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await??;

    Ok(CiChange {
      id,
      ci_id,
      change_date: input.change_date,
      change_description: input.change_description,
    })
  }
}
