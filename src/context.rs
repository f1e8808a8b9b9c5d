//! Per-call context: access token, request id and configuration override.

use uuid::Uuid;

use crate::config::ConfigurationMap;

/// Values a caller attaches to a single call.
///
/// A request id is generated on construction so that retried calls can be
/// de-duplicated by the service; replace it with [`CallContext::request_id`]
/// or drop it with [`CallContext::without_request_id`].
#[derive(Clone)]
pub struct CallContext {
    access_token: Option<String>,
    request_id: Option<String>,
    configuration: Option<ConfigurationMap>,
}

impl CallContext {
    pub fn new() -> Self {
        Self {
            access_token: None,
            request_id: Some(Uuid::new_v4().to_string()),
            configuration: None,
        }
    }

    /// A context carrying an already acquired access token, sent verbatim as `Authorization`.
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self::new().access_token(access_token)
    }

    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn without_request_id(mut self) -> Self {
        self.request_id = None;
        self
    }

    /// Use `configuration` (merged over the built-in defaults) instead of the store.
    pub fn configuration(mut self, configuration: ConfigurationMap) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn configuration_override(&self) -> Option<&ConfigurationMap> {
        self.configuration.as_ref()
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_id", &self.request_id)
            .field("configuration", &self.configuration.as_ref().map(|c| c.len()))
            .finish()
    }
}
