//! Recognized configuration keys and built-in defaults.

use crate::config::ConfigurationMap;

/// Base URL every resource path is appended to.
pub const SERVICE_ENDPOINT: &str = "service.EndPoint";

/// Deployment mode; selects `service.EndPoint.<mode>` when no explicit endpoint is set.
pub const MODE: &str = "mode";

/// Connection establishment timeout in milliseconds.
pub const HTTP_CONNECTION_TIMEOUT: &str = "http.ConnectionTimeOut";

/// Read (request) timeout in milliseconds.
pub const HTTP_READ_TIMEOUT: &str = "http.ReadTimeOut";

/// Number of additional attempts the transport may make.
pub const HTTP_RETRY: &str = "http.Retry";

/// Maximum pooled connections per host.
pub const HTTP_MAX_CONNECTION: &str = "http.MaxConnection";

pub const HTTP_USE_PROXY: &str = "http.UseProxy";
pub const HTTP_PROXY_HOST: &str = "http.ProxyHost";
pub const HTTP_PROXY_PORT: &str = "http.ProxyPort";
pub const HTTP_PROXY_USERNAME: &str = "http.ProxyUserName";
pub const HTTP_PROXY_PASSWORD: &str = "http.ProxyPassword";

/// Set when running inside a platform sandbox that forbids persistent sockets.
pub const HTTP_PLATFORM_SANDBOX: &str = "http.PlatformSandbox";

/// Originating device IP, forwarded to the service.
pub const DEVICE_IP_ADDRESS: &str = "http.IPAddress";

/// Keys that must resolve to a usable value for every call.
pub const REQUIRED_KEYS: [&str; 4] = [
    HTTP_CONNECTION_TIMEOUT,
    HTTP_READ_TIMEOUT,
    HTTP_RETRY,
    HTTP_MAX_CONNECTION,
];

const DEFAULTS: [(&str, &str); 6] = [
    (HTTP_CONNECTION_TIMEOUT, "5000"),
    (HTTP_READ_TIMEOUT, "30000"),
    (HTTP_RETRY, "1"),
    (HTTP_MAX_CONNECTION, "100"),
    (HTTP_USE_PROXY, "false"),
    (HTTP_PLATFORM_SANDBOX, "false"),
];

/// Key holding the endpoint for a given mode, e.g. `service.EndPoint.sandbox`.
pub fn mode_endpoint_key(mode: &str) -> String {
    format!("{SERVICE_ENDPOINT}.{mode}")
}

/// The built-in default configuration.
pub fn default_map() -> ConfigurationMap {
    DEFAULTS
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
