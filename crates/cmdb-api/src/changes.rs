//! Handlers for `/cis/{ci_id}/changes`: the append-only change ledger.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use cmdb_core::{
  change::{CiChange, NewChange},
  store::CmdbStore,
};

use crate::{SharedRegistry, error::ApiError, extract::{JsonBody, PathId}};

/// `GET /cis/{ci_id}/changes`: oldest `change_date` first.
pub async fn list<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(ci_id): PathId<i64>,
) -> Result<Json<Vec<CiChange>>, ApiError> {
  let changes = registry
    .list_changes(ci_id)
    .await
    .map_err(ApiError::during("Error al obtener cambios de CI"))?;
  Ok(Json(changes))
}

/// `POST /cis/{ci_id}/changes`. Body:
/// `{"change_date":"2025-06-22T12:00:00Z","change_description":"..."}`; a bare
/// `YYYY-MM-DD` date is read as midnight UTC.
pub async fn create<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(ci_id): PathId<i64>,
  JsonBody(body): JsonBody<NewChange>,
) -> Result<impl IntoResponse, ApiError> {
  let change = registry
    .append_change(ci_id, body)
    .await
    .map_err(ApiError::during("Error al crear cambio de CI"))?;
  Ok((StatusCode::CREATED, Json(change)))
}
