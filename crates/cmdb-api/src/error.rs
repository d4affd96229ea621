//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the shape `{"error": <message>, "code": <code>}`.
//! Not-found and store failures carry fixed messages; store detail never
//! reaches the client.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cmdb_core::Entity;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(&'static str),

  /// Malformed body, missing required field, or rejected patch.
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Reference(String),

  #[error("{0}")]
  Conflict(String),

  /// The store failed; the payload is the fixed per-operation message.
  #[error("{0}")]
  Store(&'static str),

  /// The request outlived `request_timeout_secs`.
  #[error("Tiempo de espera agotado")]
  Timeout,
}

fn not_found_message(entity: Entity) -> &'static str {
  match entity {
    Entity::CiType => "Tipo de CI no encontrado",
    Entity::Environment => "Ambiente no encontrado",
    Entity::Ci => "CI no encontrado",
    Entity::Relationship => "Relación no encontrada",
  }
}

impl ApiError {
  /// Build a mapper for `map_err` that reports store failures with
  /// `failure`, the fixed message for the operation being served.
  pub fn during(failure: &'static str) -> impl Fn(cmdb_core::Error) -> Self {
    move |err| match err {
      cmdb_core::Error::NotFound { entity, .. } => {
        Self::NotFound(not_found_message(entity))
      }
      e @ cmdb_core::Error::Validation(_) => Self::Validation(e.to_string()),
      e @ cmdb_core::Error::Reference { .. } => Self::Reference(e.to_string()),
      cmdb_core::Error::Conflict(m) => Self::Conflict(m),
      cmdb_core::Error::StoreUnavailable(_) => Self::Store(failure),
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::NotFound(_) => "not_found",
      Self::Validation(_) => "validation_error",
      Self::Reference(_) => "reference_error",
      Self::Conflict(_) => "conflict",
      Self::Store(_) => "store_unavailable",
      Self::Timeout => "timeout",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::Reference(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::Timeout => StatusCode::REQUEST_TIMEOUT,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = json!({ "error": self.to_string(), "code": self.code() });
    (self.status(), Json(body)).into_response()
  }
}
