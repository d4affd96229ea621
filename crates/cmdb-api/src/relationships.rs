//! Handlers for `/cis/{ci_id}/relationships` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cis/{ci_id}/relationships` | Outgoing edges as `{id, related_ci_id, relationship_type}`; `[]` if none |
//! | `POST`   | `/cis/{ci_id}/relationships` | Body: `{"related_ci_id":2,"relationship_type":"..."}` |
//! | `DELETE` | `/cis/{ci_id}/relationships/{rel_id}` | 404 unless the edge starts at `ci_id` |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use cmdb_core::{
  relationship::{NewRelationship, RelationshipLink},
  store::CmdbStore,
};

use crate::{SharedRegistry, error::ApiError, extract::{JsonBody, PathId}};

/// `GET /cis/{ci_id}/relationships`
pub async fn list<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(ci_id): PathId<i64>,
) -> Result<Json<Vec<RelationshipLink>>, ApiError> {
  let rels = registry
    .list_relationships(ci_id)
    .await
    .map_err(ApiError::during("Error al obtener relaciones de CI"))?;
  Ok(Json(rels))
}

/// `POST /cis/{ci_id}/relationships`
pub async fn create<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId(ci_id): PathId<i64>,
  JsonBody(body): JsonBody<NewRelationship>,
) -> Result<impl IntoResponse, ApiError> {
  let rel = registry
    .create_relationship(ci_id, body)
    .await
    .map_err(ApiError::during("Error al crear relación de CI"))?;
  Ok((StatusCode::CREATED, Json(rel)))
}

/// `DELETE /cis/{ci_id}/relationships/{rel_id}`
pub async fn delete<S: CmdbStore>(
  State(registry): State<SharedRegistry<S>>,
  PathId((ci_id, rel_id)): PathId<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  registry
    .delete_relationship(ci_id, rel_id)
    .await
    .map_err(ApiError::during("Error al eliminar relación de CI"))?;
  Ok(StatusCode::NO_CONTENT)
}
