//! JSON REST API for the CMDB.
//!
//! Exposes an axum [`Router`] backed by a [`RegistryService`] over any
//! [`CmdbStore`]. Every route is relative; [`app`] mounts them under `/api`
//! with request tracing and a per-request timeout.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cmdb_api::api_router(registry.clone()))
//! ```

pub mod changes;
pub mod cis;
pub mod config;
pub mod environments;
pub mod error;
pub mod extract;
pub mod relationships;
pub mod types;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  http::StatusCode,
  middleware,
  response::{IntoResponse, Response},
  routing::get,
};
use cmdb_core::{RegistryService, store::CmdbStore};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use config::ServerConfig;
pub use error::ApiError;

/// The registry as shared between handlers.
pub type SharedRegistry<S> = Arc<RegistryService<S>>;

/// Build a fully-materialised API router for `registry`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(registry: SharedRegistry<S>) -> Router<()>
where
  S: CmdbStore + 'static,
{
  Router::new()
    // Taxonomy
    .route("/types", get(types::list::<S>).post(types::create::<S>))
    .route(
      "/types/{id}",
      get(types::get_one::<S>)
        .put(types::update::<S>)
        .delete(types::delete::<S>),
    )
    .route("/envs", get(environments::list::<S>).post(environments::create::<S>))
    .route(
      "/envs/{id}",
      get(environments::get_one::<S>)
        .put(environments::update::<S>)
        .delete(environments::delete::<S>),
    )
    // Configuration items
    .route("/cis", get(cis::list::<S>).post(cis::create::<S>))
    .route(
      "/cis/{id}",
      get(cis::get_one::<S>)
        .put(cis::update::<S>)
        .delete(cis::delete::<S>),
    )
    // Change ledger
    .route(
      "/cis/{ci_id}/changes",
      get(changes::list::<S>).post(changes::create::<S>),
    )
    // Relationships
    .route(
      "/cis/{ci_id}/relationships",
      get(relationships::list::<S>).post(relationships::create::<S>),
    )
    .route(
      "/cis/{ci_id}/relationships/{rel_id}",
      axum::routing::delete(relationships::delete::<S>),
    )
    .with_state(registry)
}

/// Give the bodiless 408 from [`TimeoutLayer`] the usual error body.
async fn timeout_body(response: Response) -> Response {
  if response.status() == StatusCode::REQUEST_TIMEOUT {
    return ApiError::Timeout.into_response();
  }
  response
}

/// The complete HTTP application: [`api_router`] under `/api`, traced, with
/// requests cut off after `timeout` with a 408.
pub fn app<S>(registry: SharedRegistry<S>, timeout: Duration) -> Router
where
  S: CmdbStore + 'static,
{
  Router::new()
    .nest("/api", api_router(registry))
    .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
    .layer(middleware::map_response(timeout_body))
    .layer(TraceLayer::new_for_http())
}
