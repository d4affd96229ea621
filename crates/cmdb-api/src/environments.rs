//! Handlers for `/envs` endpoints.
//!
//! | Method   | Path         | Notes |
//! |----------|--------------|-------|
//! | `GET`    | `/envs`      | Ordered by id |
//! | `POST`   | `/envs`      | Body: `{"name":"..."}`; 201 |
//! | `GET`    | `/envs/{id}` | 404 if not found |
//! | `PUT`    | `/envs/{id}` | Body: `{"name":"..."}` |
//! | `DELETE` | `/envs/{id}` | 204; 409 while CIs are deployed in it |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use cmdb_core::{
  store::CmdbStore,
  taxonomy::{Environment, NewEnvironment},
};

use crate::{SharedRegistry, error::ApiError, extract::{JsonBody, PathId}};

/// `GET /envs`
pub async fn list<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
) -> Result<Json<Vec<Environment>>, ApiError> {
  let envs = registry
    .list_environments()
    .await
    .map_err(ApiError::during("Error al obtener ambientes"))?;
  Ok(Json(envs))
}

/// `GET /envs/{id}`
pub async fn get_one<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
) -> Result<Json<Environment>, ApiError> {
  let env = registry
    .get_environment(id)
    .await
    .map_err(ApiError::during("Error al obtener ambiente"))?;
  Ok(Json(env))
}

/// `POST /envs`
pub async fn create<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  JsonBody(body): JsonBody<NewEnvironment>,
) -> Result<impl IntoResponse, ApiError> {
  let env = registry
    .create_environment(body)
    .await
    .map_err(ApiError::during("Error al crear ambiente"))?;
  Ok((StatusCode::CREATED, Json(env)))
}

/// `PUT /envs/{id}`
pub async fn update<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
  JsonBody(body): JsonBody<NewEnvironment>,
) -> Result<Json<Environment>, ApiError> {
  let env = registry
    .update_environment(id, body)
    .await
    .map_err(ApiError::during("Error al actualizar ambiente"))?;
  Ok(Json(env))
}

/// `DELETE /envs/{id}`
pub async fn delete<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(id): PathId<i64>,
) -> Result<StatusCode, ApiError> {
  registry
    .delete_environment(id)
    .await
    .map_err(ApiError::during("Error al eliminar ambiente"))?;
  Ok(StatusCode::NO_CONTENT)
}
