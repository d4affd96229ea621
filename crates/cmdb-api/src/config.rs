//! Server configuration, read from a TOML file and `CMDB_*` environment
//! variables.
//!
//! ```toml
//! host                 = "0.0.0.0"
//! port                 = 3000
//! store_path           = "~/.local/share/cmdb/cmdb.sqlite3"
//! request_timeout_secs = 30
//!
//! [registry]
//! reject_empty_patch = true
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `CMDB_REGISTRY__REJECT_EMPTY_PATCH=false`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use cmdb_core::RegistryPolicy;
use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub request_timeout_secs: u64,
  #[serde(default)]
  pub registry:             RegistryPolicy,
}

impl ServerConfig {
  /// Load from `path` (which may be absent) layered under the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::with_file(File::from(path).required(false))
  }

  /// Load from an arbitrary file source layered under the environment.
  pub fn with_file<F>(file: F) -> Result<Self, ConfigError>
  where
    F: Source + Send + Sync + 'static,
  {
    Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 3000_i64)?
      .set_default("store_path", "cmdb.sqlite3")?
      .set_default("request_timeout_secs", 30_i64)?
      .add_source(file)
      .add_source(
        Environment::with_prefix("CMDB")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}
