//! Handlers for `/cis` endpoints.
//!
//! | Method   | Path        | Notes |
//! |----------|-------------|-------|
//! | `GET`    | `/cis`      | Each CI carries its `type` and `environment` names |
//! | `POST`   | `/cis`      | Body: [`NewCi`]; 201, 422 on unknown type/environment |
//! | `GET`    | `/cis/{id}` | 404 if not found |
//! | `PUT`    | `/cis/{id}` | Body: [`CiPatch`]; only supplied keys change |
//! | `DELETE` | `/cis/{id}` | 204; its relationships are removed too |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use cmdb_core::{
  ci::{CiPatch, CiSummary, ConfigurationItem, NewCi},
  store::CmdbStore,
};

use crate::{SharedRegistry, error::ApiError, extract::{JsonBody, PathId}};

/// `GET /cis`
pub async fn list<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
) -> Result<Json<Vec<CiSummary>>, ApiError> {
  let cis = registry
    .list_cis()
    .await
    .map_err(ApiError::during("Error al obtener CIs"))?;
  Ok(Json(cis))
}

/// `GET /cis/{id}`
pub async fn get_one<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
) -> Result<Json<ConfigurationItem>, ApiError> {
  let ci = registry
    .get_ci(id)
    .await
    .map_err(ApiError::during("Error al obtener CI"))?;
  Ok(Json(ci))
}

/// `POST /cis`
pub async fn create<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  JsonBody(body): JsonBody<NewCi>,
) -> Result<impl IntoResponse, ApiError> {
  let ci = registry
    .create_ci(body)
    .await
    .map_err(ApiError::during("Error al crear CI"))?;
  Ok((StatusCode::CREATED, Json(ci)))
}

/// `PUT /cis/{id}`: sparse patch; returns the merged CI.
pub async fn update<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
  JsonBody(patch): JsonBody<CiPatch>,
) -> Result<Json<ConfigurationItem>, ApiError> {
  let ci = registry
    .update_ci(id, patch)
    .await
    .map_err(ApiError::during("Error al actualizar CI"))?;
  Ok(Json(ci))
}

/// `DELETE /cis/{id}`
pub async fn delete<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
) -> Result<StatusCode, ApiError> {
  registry
    .delete_ci(id)
    .await
    .map_err(ApiError::during("Error al eliminar CI"))?;
  Ok(StatusCode::NO_CONTENT)
}
