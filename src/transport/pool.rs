//! Pooled client management.
//!
//! # Responsibilities
//! - Keep one `reqwest` client per distinct transport setup
//! - Hand out connections that share the client's connection pool
//! - Apply timeouts, proxy and pool size when a client is built
//!
//! # Design Decisions
//! - Clients are keyed by the settings that shape them, not by endpoint or
//!   method; calls that differ only per-request share sockets
//! - Platform-sandbox calls get a throwaway client with no idle connections
//! - Without a configured proxy, environment proxies are ignored

use std::net::Ipv6Addr;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::blocking::Client;

use crate::http::{HttpConfiguration, ProxySettings};
use crate::transport::connection::ReqwestConnection;
use crate::transport::{Connection, ConnectionManager, TransportError};

/// Settings that determine how a client is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    connection_timeout: Duration,
    read_timeout: Duration,
    max_http_connections: usize,
    proxy: Option<ProxySettings>,
}

impl From<&HttpConfiguration> for ClientKey {
    fn from(configuration: &HttpConfiguration) -> Self {
        Self {
            connection_timeout: configuration.connection_timeout(),
            read_timeout: configuration.read_timeout(),
            max_http_connections: configuration.max_http_connections(),
            proxy: configuration.proxy().cloned(),
        }
    }
}

/// [`ConnectionManager`] that reuses blocking `reqwest` clients.
#[derive(Debug, Default)]
pub struct ReqwestConnectionManager {
    clients: DashMap<ClientKey, Client>,
}

impl ReqwestConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct pooled clients.
    pub fn pooled_clients(&self) -> usize {
        self.clients.len()
    }

    fn client_for(&self, configuration: &HttpConfiguration) -> Result<Client, TransportError> {
        if configuration.platform_sandbox() {
            return build_client(configuration, 0);
        }

        let key = ClientKey::from(configuration);
        if let Some(client) = self.clients.get(&key) {
            return Ok(client.clone());
        }

        let client = build_client(configuration, configuration.max_http_connections())?;
        tracing::debug!(
            max_connections = configuration.max_http_connections(),
            proxied = configuration.proxy().is_some(),
            "Created pooled HTTP client"
        );
        Ok(self.clients.entry(key).or_insert(client).clone())
    }
}

impl ConnectionManager for ReqwestConnectionManager {
    fn connection(&self, configuration: &HttpConfiguration) -> Result<Box<dyn Connection>, TransportError> {
        let client = self.client_for(configuration)?;
        Ok(Box::new(ReqwestConnection::new(client)))
    }
}

fn build_client(configuration: &HttpConfiguration, idle_per_host: usize) -> Result<Client, TransportError> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(idle_per_host)
        .timeout(Some(configuration.read_timeout()).filter(|t| !t.is_zero()));

    if !configuration.connection_timeout().is_zero() {
        builder = builder.connect_timeout(configuration.connection_timeout());
    }

    builder = match configuration.proxy() {
        Some(proxy) => builder.proxy(build_proxy(proxy)?),
        None => builder.no_proxy(),
    };

    builder.build().map_err(TransportError::Client)
}

fn build_proxy(settings: &ProxySettings) -> Result<reqwest::Proxy, TransportError> {
    let url = proxy_url(settings);
    let proxy = reqwest::Proxy::all(&url).map_err(|source| TransportError::InvalidProxy {
        url: url.clone(),
        source,
    })?;
    Ok(match &settings.username {
        Some(username) => proxy.basic_auth(username, settings.password.as_deref().unwrap_or_default()),
        None => proxy,
    })
}

/// IPv6 literals need brackets to be valid in a URL authority.
fn proxy_url(settings: &ProxySettings) -> String {
    if settings.host.parse::<Ipv6Addr>().is_ok() {
        format!("http://[{}]:{}", settings.host, settings.port)
    } else {
        format!("http://{}:{}", settings.host, settings.port)
    }
}
