//! Transport error type.

use thiserror::Error;

/// Errors raised while acquiring a connection or exchanging a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The configured proxy is not usable.
    #[error("Invalid proxy '{url}': {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A header name or value is not valid on the wire.
    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    /// `execute` was called before `configure`.
    #[error("Connection used before it was configured")]
    NotConfigured,

    /// Connect or read timeout elapsed.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Network or protocol failure.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("Server returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    /// True if another attempt may succeed: network failures, timeouts and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout { .. } | TransportError::Request { .. } => true,
            TransportError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
