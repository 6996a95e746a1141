//! Application configuration.
//!
//! Layers, later wins: built-in defaults, a TOML file, then `DOCKET_*`
//! environment variables.
//!
//! ```toml
//! debug = false
//! bind = "0.0.0.0:3000"
//! docs_path = "/docs"
//!
//! [log]
//! level = "info"
//! json = true
//!
//! [cache.system]
//! driver = "file"
//! path = "/var/cache/docket"
//!
//! [errors.NOT_FOUND]
//! message = "Nothing at {path}"
//! code = 1004
//! httpcode = 404
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::cache::{CacheStore, FileStore, MemoryStore};
use crate::error::Error;
use crate::error_response::ErrorDefinition;
use crate::telemetry::LogConfig;

/// Name of the cache repository handed to the annotation reader.
pub const SYSTEM_CACHE: &str = "system";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Let uncaught handler failures propagate instead of mapping them to
    /// the generic system error.
    pub debug: bool,
    pub bind: String,
    /// Where the documentation endpoint is served, if anywhere.
    pub docs_path: Option<String>,
    pub log: LogConfig,
    /// Named cache repositories.
    pub cache: BTreeMap<String, CacheConfig>,
    /// Error dictionary overrides and additions.
    pub errors: BTreeMap<String, ErrorDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            bind: "0.0.0.0:3000".to_owned(),
            docs_path: None,
            log: LogConfig::default(),
            cache: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum CacheConfig {
    Memory,
    File { path: PathBuf },
    None,
}

impl CacheConfig {
    /// Opens the configured backend. `None` means "no cache".
    pub fn open(&self) -> Result<Option<Arc<dyn CacheStore>>, Error> {
        Ok(match self {
            Self::Memory => Some(Arc::new(MemoryStore::new())),
            Self::File { path } => Some(Arc::new(FileStore::open(path)?)),
            Self::None => None,
        })
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Applies `DOCKET_DEBUG`, `DOCKET_BIND` and `DOCKET_LOG_LEVEL` from the
    /// process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(debug) = lookup("DOCKET_DEBUG") {
            self.debug = matches!(debug.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(bind) = lookup("DOCKET_BIND") {
            self.bind = bind;
        }
        if let Some(level) = lookup("DOCKET_LOG_LEVEL") {
            self.log.level = level;
        }
        self
    }
}
