//! Pre-handler subsystem.
//!
//! A pre-handler turns one logical call into the three things the executor
//! needs: the endpoint URL, the outgoing headers and the payload.
//!
//! # Data Flow
//! ```text
//! CallContext + method/path/payload/custom headers
//!     → PreHandlerInput (immutable)
//!     → PreHandlerFactory::create(resolved config, input)
//!     → Box<dyn PreHandler>
//!     → HttpConfigurationBuilder (endpoint) + Executor (headers, payload)
//! ```
//!
//! # Design Decisions
//! - The factory is handed to the client explicitly; alternative auth or
//!   header schemes plug in here without touching the executor
//! - Construction does all the fallible work, accessors cannot fail
//! - A fresh pre-handler per call; factories hold no per-call state

pub mod rest;

use crate::config::{ConfigResult, ConfigurationMap};
use crate::http::Headers;
use url::Url;

pub use rest::{RestPreHandler, RestPreHandlerFactory};

/// Supplies endpoint, headers and payload for one call.
pub trait PreHandler: Send + Sync {
    /// Full URL the call is sent to.
    fn endpoint(&self) -> &Url;

    /// Headers to send.
    fn header_map(&self) -> Headers;

    /// Raw request body.
    fn payload(&self) -> &str;
}

/// Builds a [`PreHandler`] per call.
pub trait PreHandlerFactory: Send + Sync {
    fn create(
        &self,
        configuration: &ConfigurationMap,
        input: &PreHandlerInput,
    ) -> ConfigResult<Box<dyn PreHandler>>;
}

/// Everything a pre-handler is derived from, besides configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct PreHandlerInput {
    resource_path: String,
    payload: String,
    headers: Headers,
    content_type: Option<String>,
    access_token: Option<String>,
    request_id: Option<String>,
}

impl PreHandlerInput {
    pub fn new(resource_path: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            payload: payload.into(),
            headers: Headers::new(),
            content_type: None,
            access_token: None,
            request_id: None,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Content type to announce instead of JSON.
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl std::fmt::Debug for PreHandlerInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreHandlerInput")
            .field("resource_path", &self.resource_path)
            .field("payload_len", &self.payload.len())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("content_type", &self.content_type)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_id", &self.request_id)
            .finish()
    }
}
