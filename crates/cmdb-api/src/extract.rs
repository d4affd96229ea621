//! Extractors whose rejections are reported as [`ApiError`], so clients see
//! one error shape for bad bodies and bad ids alike.

use axum::{
  Json,
  extract::{
    FromRequest, FromRequestParts, Path, Request,
    rejection::{JsonRejection, PathRejection},
  },
  http::request::Parts,
};

use crate::error::ApiError;

/// Deserialises a JSON request body. Malformed JSON, a wrong content type,
/// missing required keys, and unknown patch fields all become
/// [`ApiError::Validation`].
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
  Json<T>: FromRequest<S, Rejection = JsonRejection>,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    Ok(Self(value))
  }
}

/// Path parameters, typically numeric ids. A segment that does not parse
/// (`/cis/abc`) becomes [`ApiError::Validation`].
pub struct PathId<T>(pub T);

impl<S, T> FromRequestParts<S> for PathId<T>
where
  Path<T>: FromRequestParts<S, Rejection = PathRejection>,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Path(value) = Path::<T>::from_request_parts(parts, state)
      .await
      .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    Ok(Self(value))
  }
}
