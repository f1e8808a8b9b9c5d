//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! HttpConfiguration
//!     → ConnectionManager::connection (pool.rs: client per transport setup)
//!     → Connection::configure (connection.rs: method, content type, retry budget)
//!     → Connection::execute(endpoint, payload, headers)
//!     → raw response body or TransportError
//! ```
//!
//! # Design Decisions
//! - The executor only sees the two traits; any client library can sit behind them
//! - Retries happen here, bounded by `http.Retry`; callers above never loop
//! - Non-success statuses are errors carrying the response body

pub mod connection;
pub mod error;
pub mod pool;

use url::Url;

use crate::http::{Headers, HttpConfiguration};

pub use connection::ReqwestConnection;
pub use error::TransportError;
pub use pool::ReqwestConnectionManager;

/// Hands out connections for a given configuration. Must tolerate concurrent callers.
pub trait ConnectionManager: Send + Sync {
    fn connection(&self, configuration: &HttpConfiguration) -> Result<Box<dyn Connection>, TransportError>;
}

/// One request/response exchange.
pub trait Connection: Send {
    /// Apply per-call settings. Must be called before [`Connection::execute`].
    fn configure(&mut self, configuration: &HttpConfiguration) -> Result<(), TransportError>;

    /// Send `payload` with `headers` and return the raw response body.
    fn execute(&self, endpoint: &Url, payload: &str, headers: &Headers) -> Result<String, TransportError>;
}
