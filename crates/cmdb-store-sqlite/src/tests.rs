//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use cmdb_core::{
  Entity,
  change::NewChange,
  ci::{CiPatch, NewCi},
  relationship::{NewRelationship, RelationshipLink},
  store::CmdbStore,
  taxonomy::{NewCiType, NewEnvironment},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// A store seeded with one type and one environment; returns their ids.
async fn seeded() -> (SqliteStore, i64, i64) {
  let s = store().await;
  let ty = s
    .create_ci_type(NewCiType::new("Server", Some("Physical host")))
    .await
    .unwrap();
  let env = s
    .create_environment(NewEnvironment::new("Production"))
    .await
    .unwrap();
  (s, ty.id, env.id)
}

fn full_ci(type_id: i64, environment_id: i64) -> NewCi {
  NewCi {
    name: "db-01".into(),
    type_id,
    environment_id,
    description: Some("Primary database".into()),
    serial_number: Some("SN-4411".into()),
    version: Some("16.2".into()),
    acquisition_date: Some(date(2024, 11, 3)),
    status: Some("Activo".into()),
    location: Some("DC-1 rack 4".into()),
    owner: Some("dba-team".into()),
    documentation_url: Some("https://wiki.example.com/db-01".into()),
    incident_url: None,
    security_level: Some("Alto".into()),
    compliance: Some("ISO 27001".into()),
    config_state: Some("baseline".into()),
    license_number: Some("LIC-001".into()),
    license_expiration_date: Some(date(2026, 1, 31)),
  }
}

// ─── Taxonomy ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ci_types_listed_in_id_order() {
  let s = store().await;
  for name in ["Server", "Database", "Network"] {
    s.create_ci_type(NewCiType::new(name, None)).await.unwrap();
  }

  let all = s.list_ci_types().await.unwrap();
  let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, ["Server", "Database", "Network"]);
  assert!(all.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn ci_type_update_replaces_fields() {
  let s = store().await;
  let ty = s
    .create_ci_type(NewCiType::new("Server", Some("old")))
    .await
    .unwrap();

  let updated = s
    .update_ci_type(ty.id, NewCiType::new("Host", None))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.name, "Host");
  assert_eq!(updated.description, None);

  let fetched = s.get_ci_type(ty.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_missing_taxonomy_returns_none() {
  let s = store().await;
  assert!(s.update_ci_type(42, NewCiType::new("X", None)).await.unwrap().is_none());
  assert!(s.update_environment(42, NewEnvironment::new("X")).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_taxonomy_names_are_rejected() {
  let (s, ty_id, _) = seeded().await;

  let err = s
    .create_ci_type(NewCiType::new("Server", None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateName { entity: Entity::CiType, .. }));

  let err = s
    .create_environment(NewEnvironment::new("Production"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateName { entity: Entity::Environment, .. }));

  // Renaming a row to its own name is not a duplicate.
  s.update_ci_type(ty_id, NewCiType::new("Server", None))
    .await
    .unwrap()
    .unwrap();
}

#[tokio::test]
async fn taxonomy_in_use_cannot_be_deleted() {
  let (s, ty_id, env_id) = seeded().await;
  s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();

  let err = s.delete_ci_type(ty_id).await.unwrap_err();
  assert!(matches!(err, Error::InUse { dependents: 1, .. }));
  let err = s.delete_environment(env_id).await.unwrap_err();
  assert!(matches!(err, Error::InUse { entity: Entity::Environment, .. }));

  assert!(s.get_ci_type(ty_id).await.unwrap().is_some());
}

#[tokio::test]
async fn unused_taxonomy_deletes_then_reports_missing() {
  let (s, ty_id, env_id) = seeded().await;
  assert!(s.delete_ci_type(ty_id).await.unwrap());
  assert!(!s.delete_ci_type(ty_id).await.unwrap());
  assert!(s.delete_environment(env_id).await.unwrap());
  assert!(s.get_environment(env_id).await.unwrap().is_none());
}

// ─── CIs ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_ci_roundtrip() {
  let (s, ty_id, env_id) = seeded().await;
  let input = full_ci(ty_id, env_id);

  let created = s.create_ci(input.clone()).await.unwrap();
  let fetched = s.get_ci(created.id).await.unwrap().unwrap();

  assert_eq!(fetched, input.into_item(created.id));
}

#[tokio::test]
async fn get_ci_missing_returns_none() {
  let s = store().await;
  assert!(s.get_ci(999).await.unwrap().is_none());
}

#[tokio::test]
async fn create_ci_with_missing_type_creates_nothing() {
  let (s, _, env_id) = seeded().await;

  let err = s.create_ci(NewCi::new("ghost", 77, env_id)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::MissingReference { entity: Entity::CiType, id: 77 }
  ));
  assert!(s.list_cis().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_ci_with_missing_environment_fails() {
  let (s, ty_id, _) = seeded().await;
  let err = s.create_ci(NewCi::new("ghost", ty_id, 5)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::MissingReference { entity: Entity::Environment, id: 5 }
  ));
}

#[tokio::test]
async fn list_cis_joins_taxonomy_names() {
  let (s, ty_id, env_id) = seeded().await;
  let a = s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();
  let b = s.create_ci(NewCi::new("web-02", ty_id, env_id)).await.unwrap();

  let all = s.list_cis().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].ci.id, a.id);
  assert_eq!(all[1].ci.id, b.id);
  assert!(all.iter().all(|c| c.type_name == "Server"));
  assert!(all.iter().all(|c| c.environment_name == "Production"));
}

#[tokio::test]
async fn sparse_update_changes_only_supplied_fields() {
  let (s, ty_id, env_id) = seeded().await;
  let before = s.create_ci(full_ci(ty_id, env_id)).await.unwrap();

  let patch = CiPatch { owner: Some(Some("X".into())), ..Default::default() };
  let after = s.update_ci(before.id, patch).await.unwrap().unwrap();

  assert_eq!(after.owner.as_deref(), Some("X"));
  assert_eq!(
    after,
    cmdb_core::ci::ConfigurationItem { owner: Some("X".into()), ..before.clone() }
  );
  assert_eq!(s.get_ci(before.id).await.unwrap().unwrap(), after);
}

#[tokio::test]
async fn update_can_clear_nullable_fields() {
  let (s, ty_id, env_id) = seeded().await;
  let ci = s.create_ci(full_ci(ty_id, env_id)).await.unwrap();

  let patch = CiPatch {
    location:                Some(None),
    license_expiration_date: Some(None),
    ..Default::default()
  };
  let after = s.update_ci(ci.id, patch).await.unwrap().unwrap();
  assert_eq!(after.location, None);
  assert_eq!(after.license_expiration_date, None);
  assert_eq!(after.serial_number, ci.serial_number);
}

#[tokio::test]
async fn update_with_missing_reference_leaves_row_intact() {
  let (s, ty_id, env_id) = seeded().await;
  let ci = s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();

  let patch = CiPatch {
    name:           Some("renamed".into()),
    environment_id: Some(404),
    ..Default::default()
  };
  let err = s.update_ci(ci.id, patch).await.unwrap_err();
  assert!(matches!(
    err,
    Error::MissingReference { entity: Entity::Environment, id: 404 }
  ));
  assert_eq!(s.get_ci(ci.id).await.unwrap().unwrap().name, "web-01");
}

#[tokio::test]
async fn update_missing_ci_returns_none() {
  let s = store().await;
  let patch = CiPatch { owner: Some(Some("X".into())), ..Default::default() };
  assert!(s.update_ci(12, patch).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_ci_twice() {
  let (s, ty_id, env_id) = seeded().await;
  let ci = s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();

  assert!(s.delete_ci(ci.id).await.unwrap());
  assert!(!s.delete_ci(ci.id).await.unwrap());
}

#[tokio::test]
async fn ci_with_blank_optional_fields_round_trips() {
  let (s, ty_id, env_id) = seeded().await;
  let body = serde_json::json!({
    "name": "NewCI", "type_id": ty_id, "description": "desc",
    "serial_number": "SN", "version": "v1", "acquisition_date": "2025-01-01",
    "status": "Activo", "location": "Loc", "owner": "Owner",
    "documentation_url": "", "incident_url": "", "security_level": "Medio",
    "compliance": "", "config_state": "", "license_number": "",
    "license_expiration_date": "", "environment_id": env_id,
  });
  let input: NewCi = serde_json::from_value(body).unwrap();

  let created = s.create_ci(input).await.unwrap();
  assert_eq!(created.acquisition_date, Some(date(2025, 1, 1)));
  assert_eq!(created.license_expiration_date, None);
  assert_eq!(created.compliance.as_deref(), Some(""));
  assert_eq!(s.get_ci(created.id).await.unwrap(), Some(created));
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  let (s, ty_id, env_id) = seeded().await;
  let first = s.create_ci(NewCi::new("a", ty_id, env_id)).await.unwrap();
  s.delete_ci(first.id).await.unwrap();
  let second = s.create_ci(NewCi::new("b", ty_id, env_id)).await.unwrap();
  assert!(second.id > first.id);
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[tokio::test]
async fn relationships_listed_by_source() {
  let (s, ty_id, env_id) = seeded().await;
  let app = s.create_ci(NewCi::new("app", ty_id, env_id)).await.unwrap();
  let db = s.create_ci(NewCi::new("db", ty_id, env_id)).await.unwrap();

  let rel = s
    .create_relationship(app.id, NewRelationship::new(db.id, "depends_on"))
    .await
    .unwrap();
  assert_eq!(rel.ci_id, app.id);
  assert_eq!(rel.related_ci_id, db.id);

  assert_eq!(
    s.list_relationships(app.id).await.unwrap(),
    vec![RelationshipLink::from(rel)]
  );
  assert!(s.list_relationships(db.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_edges_are_permitted() {
  let (s, ty_id, env_id) = seeded().await;
  let a = s.create_ci(NewCi::new("a", ty_id, env_id)).await.unwrap();
  let b = s.create_ci(NewCi::new("b", ty_id, env_id)).await.unwrap();

  for _ in 0..2 {
    s.create_relationship(a.id, NewRelationship::new(b.id, "hosts"))
      .await
      .unwrap();
  }
  assert_eq!(s.list_relationships(a.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn relationship_to_missing_ci_fails() {
  let (s, ty_id, env_id) = seeded().await;
  let a = s.create_ci(NewCi::new("a", ty_id, env_id)).await.unwrap();

  let err = s
    .create_relationship(a.id, NewRelationship::new(31, "hosts"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingReference { entity: Entity::Ci, id: 31 }));

  let err = s
    .create_relationship(30, NewRelationship::new(a.id, "hosts"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingReference { entity: Entity::Ci, id: 30 }));
}

#[tokio::test]
async fn relationship_delete_is_scoped_to_its_source() {
  let (s, ty_id, env_id) = seeded().await;
  let c1 = s.create_ci(NewCi::new("c1", ty_id, env_id)).await.unwrap();
  let c2 = s.create_ci(NewCi::new("c2", ty_id, env_id)).await.unwrap();
  let rel = s
    .create_relationship(c2.id, NewRelationship::new(c1.id, "runs_on"))
    .await
    .unwrap();

  assert!(!s.delete_relationship(c1.id, rel.id).await.unwrap());
  assert_eq!(
    s.list_relationships(c2.id).await.unwrap(),
    vec![RelationshipLink::from(rel.clone())]
  );

  assert!(s.delete_relationship(c2.id, rel.id).await.unwrap());
  assert!(s.list_relationships(c2.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_ci_cascades_its_relationships() {
  let (s, ty_id, env_id) = seeded().await;
  let a = s.create_ci(NewCi::new("a", ty_id, env_id)).await.unwrap();
  let b = s.create_ci(NewCi::new("b", ty_id, env_id)).await.unwrap();
  let c = s.create_ci(NewCi::new("c", ty_id, env_id)).await.unwrap();
  s.create_relationship(a.id, NewRelationship::new(b.id, "depends_on"))
    .await
    .unwrap();
  s.create_relationship(c.id, NewRelationship::new(b.id, "depends_on"))
    .await
    .unwrap();
  s.create_relationship(c.id, NewRelationship::new(a.id, "depends_on"))
    .await
    .unwrap();

  // `b` is only ever a target.
  assert!(s.delete_ci(b.id).await.unwrap());

  assert!(s.list_relationships(a.id).await.unwrap().is_empty());
  let remaining = s.list_relationships(c.id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].related_ci_id, a.id);
}

// ─── Change ledger ───────────────────────────────────────────────────────────

#[tokio::test]
async fn changes_listed_by_date_not_insertion() {
  let (s, ty_id, env_id) = seeded().await;
  let ci = s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();

  for (d, text) in [
    (at(2025, 1, 1, 0), "installed"),
    (at(2025, 3, 1, 0), "patched"),
    (at(2025, 2, 1, 0), "reconfigured"),
  ] {
    s.append_change(ci.id, NewChange::new(d, text)).await.unwrap();
  }

  let dates: Vec<_> = s
    .list_changes(ci.id)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.change_date)
    .collect();
  assert_eq!(dates, [at(2025, 1, 1, 0), at(2025, 2, 1, 0), at(2025, 3, 1, 0)]);
}

#[tokio::test]
async fn changes_on_the_same_day_keep_time_order() {
  let (s, ty_id, env_id) = seeded().await;
  let ci = s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();

  let evening: NewChange = serde_json::from_str(
    r#"{"change_date": "2025-06-22T18:00:00Z", "change_description": "rollback"}"#,
  )
  .unwrap();
  let noon: NewChange = serde_json::from_str(
    r#"{"change_date": "2025-06-22T12:00:00Z", "change_description": "deploy"}"#,
  )
  .unwrap();
  let stored = s.append_change(ci.id, evening).await.unwrap();
  assert_eq!(stored.change_date, at(2025, 6, 22, 18));
  s.append_change(ci.id, noon).await.unwrap();

  let listed: Vec<_> = s
    .list_changes(ci.id)
    .await
    .unwrap()
    .into_iter()
    .map(|c| (c.change_date, c.change_description))
    .collect();
  assert_eq!(listed, [
    (at(2025, 6, 22, 12), "deploy".to_string()),
    (at(2025, 6, 22, 18), "rollback".to_string()),
  ]);
}

#[tokio::test]
async fn append_change_for_missing_ci_fails() {
  let s = store().await;
  let err = s
    .append_change(8, NewChange::new(at(2025, 1, 1, 0), "nope"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingReference { entity: Entity::Ci, id: 8 }));
  assert!(s.list_changes(8).await.unwrap().is_empty());
}

#[tokio::test]
async fn change_history_survives_ci_deletion() {
  let (s, ty_id, env_id) = seeded().await;
  let ci = s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();
  let entry = s
    .append_change(ci.id, NewChange::new(at(2025, 1, 1, 0), "installed"))
    .await
    .unwrap();

  s.delete_ci(ci.id).await.unwrap();

  assert_eq!(s.list_changes(ci.id).await.unwrap(), vec![entry]);
}

#[tokio::test]
async fn empty_listings_for_unknown_ci() {
  let s = store().await;
  assert!(s.list_relationships(1).await.unwrap().is_empty());
  assert!(s.list_changes(1).await.unwrap().is_empty());
}

// ─── Error mapping ───────────────────────────────────────────────────────────

#[tokio::test]
async fn violations_map_onto_core_taxonomy() {
  let (s, ty_id, env_id) = seeded().await;
  s.create_ci(NewCi::new("web-01", ty_id, env_id)).await.unwrap();

  let missing: cmdb_core::Error = s
    .create_ci(NewCi::new("x", 99, env_id))
    .await
    .unwrap_err()
    .into();
  assert!(matches!(
    missing,
    cmdb_core::Error::Reference { entity: Entity::CiType, id: 99 }
  ));

  let in_use: cmdb_core::Error = s.delete_ci_type(ty_id).await.unwrap_err().into();
  assert!(matches!(in_use, cmdb_core::Error::Conflict(_)));
}
