//! Logging setup.
//!
//! docket logs through `tracing`; this installs a `tracing-subscriber`
//! formatter for binaries that do not bring their own.

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::Error;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// An `EnvFilter` directive, e.g. `info` or `docket=debug,hyper=warn`.
    pub level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false }
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), Error> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::Telemetry(format!("invalid log level `{}`: {e}", config.level)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| Error::Telemetry(e.to_string()))
}
