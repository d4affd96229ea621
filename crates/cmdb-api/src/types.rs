//! Handlers for `/types` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/types`      | Ordered by id |
//! | `POST`   | `/types`      | Body: `{"name":"...","description":"..."}`; 201 |
//! | `GET`    | `/types/{id}` | 404 if not found |
//! | `PUT`    | `/types/{id}` | Full replace of name and description |
//! | `DELETE` | `/types/{id}` | 204; 409 while CIs use the type |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use cmdb_core::{
  store::CmdbStore,
  taxonomy::{CiType, NewCiType},
};

use crate::{SharedRegistry, error::ApiError, extract::{JsonBody, PathId}};

/// `GET /types`
pub async fn list<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
) -> Result<Json<Vec<CiType>>, ApiError> {
  let types = registry
    .list_ci_types()
    .await
    .map_err(ApiError::during("Error al obtener tipos de CI"))?;
  Ok(Json(types))
}

/// `GET /types/{id}`
pub async fn get_one<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
) -> Result<Json<CiType>, ApiError> {
  let ty = registry
    .get_ci_type(id)
    .await
    .map_err(ApiError::during("Error al obtener tipo de CI"))?;
  Ok(Json(ty))
}

/// `POST /types`
pub async fn create<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  JsonBody(body): JsonBody<NewCiType>,
) -> Result<impl IntoResponse, ApiError> {
  let ty = registry
    .create_ci_type(body)
    .await
    .map_err(ApiError::during("Error al crear tipo de CI"))?;
  Ok((StatusCode::CREATED, Json(ty)))
}

/// `PUT /types/{id}`
pub async fn update<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
  JsonBody(body): JsonBody<NewCiType>,
) -> Result<Json<CiType>, ApiError> {
  let ty = registry
    .update_ci_type(id, body)
    .await
    .map_err(ApiError::during("Error al actualizar tipo de CI"))?;
  Ok(Json(ty))
}

/// `DELETE /types/{id}`
pub async fn delete<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
) -> Result<StatusCode, ApiError> {
  registry
    .delete_ci_type(id)
    .await
    .map_err(ApiError::during("Error al eliminar tipo de CI"))?;
  Ok(StatusCode::NO_CONTENT)
}
