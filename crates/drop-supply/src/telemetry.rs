//! Logging setup.
//!
//! Events go to stderr; stdout is reserved for the run outcome.

use std::io;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter {filter:?}: {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl LogConfig {
    /// `DROP_SUPPLY_LOG_LEVEL` and `DROP_SUPPLY_JSON_LOGS` over the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup("DROP_SUPPLY_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: lookup("DROP_SUPPLY_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    fn filter(&self) -> Result<EnvFilter, TelemetryError> {
        EnvFilter::try_from_default_env().or_else(|_| {
            EnvFilter::try_new(&self.log_level).map_err(|e| TelemetryError::InvalidFilter {
                filter: self.log_level.clone(),
                message: e.to_string(),
            })
        })
    }
}

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    let env_filter = config.filter()?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(io::stderr);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(io::stderr);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    tracing::debug!(
        json_logs = config.json_logs,
        log_level = %config.log_level,
        "Logging initialized"
    );
    Ok(())
}
