//! HTTP request description.
//!
//! # Data Flow
//! ```text
//! resolved ConfigurationMap + HttpMethod + content type + PreHandler
//!     → configuration.rs (HttpConfigurationBuilder::build)
//!     → HttpConfiguration (immutable, one per call)
//!     → transport (client selection, request settings)
//! ```

pub mod configuration;
pub mod headers;
pub mod method;

pub use configuration::{HttpConfiguration, HttpConfigurationBuilder, ProxySettings};
pub use headers::Headers;
pub use method::HttpMethod;
