//! Default pre-handler for JSON REST services.

use url::Url;

use crate::config::keys::{self, MODE, SERVICE_ENDPOINT};
use crate::config::{ConfigResult, ConfigurationError, ConfigurationMap};
use crate::http::headers::{
    insert_header, ACCEPT, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE, USER_AGENT, X_REQUEST_ID,
};
use crate::http::Headers;
use crate::prehandler::{PreHandler, PreHandlerFactory, PreHandlerInput};

/// Endpoint = configured base URL + resource path; JSON content negotiation;
/// token and request id forwarded as headers.
#[derive(Debug, Clone)]
pub struct RestPreHandler {
    endpoint: Url,
    headers: Headers,
    payload: String,
}

impl RestPreHandler {
    pub fn new(configuration: &ConfigurationMap, input: &PreHandlerInput) -> ConfigResult<Self> {
        let base = base_url(configuration)?;
        let endpoint = join_endpoint(base, input.resource_path())?;

        let mut headers = Headers::new();
        let content_type = input.content_type().unwrap_or(APPLICATION_JSON);
        headers.insert(CONTENT_TYPE.to_string(), content_type.to_string());
        headers.insert(ACCEPT.to_string(), APPLICATION_JSON.to_string());
        headers.insert(USER_AGENT.to_string(), user_agent());
        if let Some(token) = input.access_token() {
            headers.insert(AUTHORIZATION.to_string(), token.to_string());
        }
        if let Some(request_id) = input.request_id() {
            headers.insert(X_REQUEST_ID.to_string(), request_id.to_string());
        }
        // Caller supplied headers win over the defaults above.
        for (name, value) in input.headers() {
            insert_header(&mut headers, name, value);
        }

        Ok(Self {
            endpoint,
            headers,
            payload: input.payload().to_string(),
        })
    }
}

impl PreHandler for RestPreHandler {
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn header_map(&self) -> Headers {
        self.headers.clone()
    }

    fn payload(&self) -> &str {
        &self.payload
    }
}

/// Factory for [`RestPreHandler`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RestPreHandlerFactory;

impl PreHandlerFactory for RestPreHandlerFactory {
    fn create(
        &self,
        configuration: &ConfigurationMap,
        input: &PreHandlerInput,
    ) -> ConfigResult<Box<dyn PreHandler>> {
        Ok(Box::new(RestPreHandler::new(configuration, input)?))
    }
}

fn non_blank<'a>(configuration: &'a ConfigurationMap, key: &str) -> Option<&'a str> {
    configuration
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// `service.EndPoint`, or `service.EndPoint.<mode>` when only a mode is set.
fn base_url(configuration: &ConfigurationMap) -> ConfigResult<&str> {
    if let Some(endpoint) = non_blank(configuration, SERVICE_ENDPOINT) {
        return Ok(endpoint);
    }
    non_blank(configuration, MODE)
        .and_then(|mode| non_blank(configuration, &keys::mode_endpoint_key(mode)))
        .ok_or(ConfigurationError::MissingEndpoint)
}

fn join_endpoint(base: &str, resource_path: &str) -> ConfigResult<Url> {
    let path = resource_path.trim_start_matches('/');
    let joined = if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    };
    Url::parse(&joined).map_err(|source| ConfigurationError::InvalidEndpoint {
        endpoint: joined,
        source,
    })
}

fn user_agent() -> String {
    format!(
        "{}/{} ({}; {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
