//! Connection settings
//!
//! `PostgresConfig` is read once from the `[postgres]` table of a TOML
//! document and is immutable afterwards. The `options` table is passed
//! through verbatim to the TLS resolver; only `sslmode`, `sslrootcert`,
//! `sslcert` and `sslkey` are interpreted there.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    /// Database host, optionally with a `:port` suffix (default port 5432)
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Username
    #[serde(default)]
    pub username: String,

    /// Password
    #[serde(default)]
    pub password: String,

    /// Database name
    #[serde(default)]
    pub database: String,

    /// Emit a connect-time log line and install the query hook
    #[serde(default)]
    pub debug: bool,

    /// Maximum driver-side pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Free-form `sslmode`/`sslrootcert`/`sslcert`/`sslkey` options plus any
    /// additional entries, passed through verbatim
    #[serde(default)]
    pub options: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    postgres: Option<PostgresConfig>,
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_pool_size() -> usize {
    4
}

impl PostgresConfig {
    /// Parse the `[postgres]` table out of a TOML document.
    ///
    /// A document without a `[postgres]` table is a configuration error
    /// ([`Error::EmptyConfig`]), not an empty default. When the options
    /// table has no `sslmode` entry, `disable` is injected.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(source)?;
        let mut config = file.postgres.ok_or(Error::EmptyConfig)?;

        config
            .options
            .entry("sslmode".to_string())
            .or_insert_with(|| "disable".to_string());

        Ok(config)
    }

    /// Load configuration from a TOML file on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Split the configured hostname into host and port
    pub(crate) fn host_port(&self) -> (&str, u16) {
        if let Some((host, port)) = self.hostname.rsplit_once(':') {
            if let Ok(port) = port.parse::<u16>() {
                return (host, port);
            }
        }
        (self.hostname.as_str(), 5432)
    }
}
