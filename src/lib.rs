//! REST call pipeline.
//!
//! Turns a logical API call (method, resource path, payload, optional
//! [`CallContext`]) into a typed result: resolve configuration, derive the
//! request through a pre-handler, build the HTTP configuration, execute it on
//! a pooled transport, record diagnostics, decode the response.

pub mod client;
pub mod codec;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod http;
pub mod observability;
pub mod prehandler;
pub mod transport;

pub use client::{RestClient, RestClientBuilder};
pub use config::{ConfigSource, ConfigurationError, ConfigurationMap, ConfigurationStore};
pub use context::CallContext;
pub use diagnostics::{DiagnosticSink, Diagnostics, ThreadLocalSink};
pub use error::{ClientError, FailureCause};
pub use executor::Executor;
pub use http::{Headers, HttpConfiguration, HttpConfigurationBuilder, HttpMethod};
pub use prehandler::{PreHandler, PreHandlerFactory, PreHandlerInput, RestPreHandlerFactory};
