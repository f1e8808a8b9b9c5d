//! Configuration error type.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration source could not be read.
    #[error("IO error reading {}: {source}", path.as_ref().map_or_else(|| "configuration stream".to_string(), |p| p.display().to_string()))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// A properties source contained an invalid line.
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A TOML source failed to parse or held an unsupported value.
    #[error("TOML error: {0}")]
    Toml(String),

    /// A required key is absent.
    #[error("Missing configuration value for '{key}'")]
    Missing { key: String },

    /// A key that must be numeric holds something else.
    #[error("Invalid numeric value '{value}' for '{key}'")]
    InvalidNumber { key: String, value: String },

    /// A key that must be a boolean holds something else.
    #[error("Invalid boolean value '{value}' for '{key}'")]
    InvalidBoolean { key: String, value: String },

    /// No endpoint could be derived from `service.EndPoint` or `mode`.
    #[error("No service endpoint configured")]
    MissingEndpoint,

    /// The endpoint does not form a valid URL.
    #[error("Invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;
