//! Core types and trait definitions for the CMDB.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! defines the domain model, the [`store::CmdbStore`] abstraction that storage
//! backends implement, and the [`service::RegistryService`] that enforces the
//! registry's invariants on top of any backend.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod change;
pub mod ci;
pub mod date;
pub mod error;
pub mod relationship;
pub mod service;
pub mod store;
pub mod taxonomy;

pub use error::{Entity, Error, Result};
pub use service::{RegistryPolicy, RegistryService};
