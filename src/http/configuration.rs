//! Immutable per-call transport configuration.
//!
//! # Responsibilities
//! - Turn a resolved configuration map into typed transport settings
//! - Reject missing or malformed required values before any I/O happens
//!
//! # Design Decisions
//! - `HttpConfigurationBuilder::build` is a pure function: no globals, no I/O
//! - `HttpConfiguration` has no setters; it is built once and moved into the executor
//! - Proxy settings exist only when `http.UseProxy` is true

use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::config::keys::{
    DEVICE_IP_ADDRESS, HTTP_CONNECTION_TIMEOUT, HTTP_MAX_CONNECTION, HTTP_PLATFORM_SANDBOX,
    HTTP_PROXY_HOST, HTTP_PROXY_PASSWORD, HTTP_PROXY_PORT, HTTP_PROXY_USERNAME, HTTP_READ_TIMEOUT,
    HTTP_RETRY, HTTP_USE_PROXY,
};
use crate::config::{ConfigResult, ConfigurationError, ConfigurationMap};
use crate::http::headers::APPLICATION_JSON;
use crate::http::method::HttpMethod;
use crate::prehandler::PreHandler;

/// Proxy the transport must route through.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Transport settings for exactly one call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpConfiguration {
    method: HttpMethod,
    endpoint: Url,
    content_type: String,
    connection_timeout_ms: u64,
    read_timeout_ms: u64,
    max_retry: u32,
    max_http_connections: usize,
    proxy: Option<ProxySettings>,
    platform_sandbox: bool,
    device_ip: Option<String>,
}

impl HttpConfiguration {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Zero means no connect timeout.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// Zero means no read timeout.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Additional attempts the transport may make after the first.
    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    pub fn max_http_connections(&self) -> usize {
        self.max_http_connections
    }

    pub fn proxy(&self) -> Option<&ProxySettings> {
        self.proxy.as_ref()
    }

    pub fn platform_sandbox(&self) -> bool {
        self.platform_sandbox
    }

    pub fn device_ip(&self) -> Option<&str> {
        self.device_ip.as_deref()
    }
}

/// Builds [`HttpConfiguration`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConfigurationBuilder;

impl HttpConfigurationBuilder {
    /// Assemble the configuration for one call.
    ///
    /// `content_type` wins when it is non-blank; otherwise JSON is used.
    pub fn build(
        configuration: &ConfigurationMap,
        method: HttpMethod,
        content_type: Option<&str>,
        pre_handler: &dyn PreHandler,
    ) -> ConfigResult<HttpConfiguration> {
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(APPLICATION_JSON)
            .to_string();

        let platform_sandbox = flag(configuration, HTTP_PLATFORM_SANDBOX)?;

        let proxy = if flag(configuration, HTTP_USE_PROXY)? {
            Some(ProxySettings {
                port: required_number(configuration, HTTP_PROXY_PORT)?,
                host: optional(configuration, HTTP_PROXY_HOST).ok_or_else(|| {
                    ConfigurationError::Missing {
                        key: HTTP_PROXY_HOST.to_string(),
                    }
                })?,
                username: optional(configuration, HTTP_PROXY_USERNAME),
                password: optional(configuration, HTTP_PROXY_PASSWORD),
            })
        } else {
            None
        };

        Ok(HttpConfiguration {
            method,
            endpoint: pre_handler.endpoint().clone(),
            content_type,
            connection_timeout_ms: required_number(configuration, HTTP_CONNECTION_TIMEOUT)?,
            read_timeout_ms: required_number(configuration, HTTP_READ_TIMEOUT)?,
            max_retry: required_number(configuration, HTTP_RETRY)?,
            max_http_connections: required_number(configuration, HTTP_MAX_CONNECTION)?,
            proxy,
            platform_sandbox,
            device_ip: optional(configuration, DEVICE_IP_ADDRESS),
        })
    }
}

fn optional(configuration: &ConfigurationMap, key: &str) -> Option<String> {
    configuration
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_number<T: FromStr>(configuration: &ConfigurationMap, key: &str) -> ConfigResult<T> {
    let raw = configuration.get(key).ok_or_else(|| ConfigurationError::Missing {
        key: key.to_string(),
    })?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidNumber {
            key: key.to_string(),
            value: raw.clone(),
        })
}

/// Absent or blank is `false`; anything other than `true`/`false` is an error.
fn flag(configuration: &ConfigurationMap, key: &str) -> ConfigResult<bool> {
    match configuration.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(ConfigurationError::InvalidBoolean {
            key: key.to_string(),
            value: v.to_string(),
        }),
    }
}
