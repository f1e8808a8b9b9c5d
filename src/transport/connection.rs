//! A single configured exchange over a pooled `reqwest` client.
//!
//! # Responsibilities
//! - Apply per-call settings (method, content type, retry budget)
//! - Convert headers to their wire form
//! - Send, retrying failed attempts up to the configured count
//! - Tag log events with a connection ID

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::http::headers::{contains_header, CONTENT_TYPE, X_FORWARDED_FOR};
use crate::http::{Headers, HttpConfiguration};
use crate::observability::metrics;
use crate::transport::{Connection, TransportError};

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Tags log events of one connection, e.g. `conn-7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct RequestSettings {
    method: reqwest::Method,
    content_type: String,
    max_retry: u32,
    device_ip: Option<String>,
}

/// [`Connection`] backed by a blocking `reqwest` client.
#[derive(Debug)]
pub struct ReqwestConnection {
    id: ConnectionId,
    client: Client,
    settings: Option<RequestSettings>,
}

impl ReqwestConnection {
    pub fn new(client: Client) -> Self {
        Self {
            id: ConnectionId::next(),
            client,
            settings: None,
        }
    }

    fn send_once(
        &self,
        method: &reqwest::Method,
        endpoint: &Url,
        payload: &str,
        headers: &HeaderMap,
    ) -> Result<String, TransportError> {
        let mut request = self
            .client
            .request(method.clone(), endpoint.clone())
            .headers(headers.clone());
        if !payload.is_empty() {
            request = request.body(payload.to_string());
        }

        let response = request.send().map_err(|e| classify(endpoint, e))?;
        let status = response.status();
        let body = response.text().map_err(|e| classify(endpoint, e))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Connection for ReqwestConnection {
    fn configure(&mut self, configuration: &HttpConfiguration) -> Result<(), TransportError> {
        self.settings = Some(RequestSettings {
            method: configuration.method().into(),
            content_type: configuration.content_type().to_string(),
            max_retry: configuration.max_retry(),
            device_ip: configuration.device_ip().map(str::to_string),
        });
        Ok(())
    }

    fn execute(&self, endpoint: &Url, payload: &str, headers: &Headers) -> Result<String, TransportError> {
        let settings = self.settings.as_ref().ok_or(TransportError::NotConfigured)?;
        let wire_headers = wire_headers(headers, settings)?;
        let attempts = settings.max_retry.saturating_add(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::debug!(
                connection_id = %self.id,
                method = %settings.method,
                url = %endpoint,
                attempt,
                "Sending request"
            );

            match self.send_once(&settings.method, endpoint, payload, &wire_headers) {
                Ok(body) => return Ok(body),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    tracing::info!(connection_id = %self.id, attempt, error = %e, "Retrying request");
                    metrics::record_retry(settings.method.as_str());
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn wire_headers(headers: &Headers, settings: &RequestSettings) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len() + 2);
    for (name, value) in headers {
        let invalid = || TransportError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }

    let content_type = HeaderValue::from_str(&settings.content_type).map_err(|_| {
        TransportError::InvalidHeader {
            name: CONTENT_TYPE.to_string(),
        }
    })?;
    map.insert(reqwest::header::CONTENT_TYPE, content_type);

    if let Some(ip) = &settings.device_ip {
        if !contains_header(headers, X_FORWARDED_FOR) {
            let value = HeaderValue::from_str(ip).map_err(|_| TransportError::InvalidHeader {
                name: X_FORWARDED_FOR.to_string(),
            })?;
            map.insert(HeaderName::from_static("x-forwarded-for"), value);
        }
    }

    Ok(map)
}

fn classify(endpoint: &Url, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: endpoint.to_string(),
        }
    } else {
        TransportError::Request {
            url: endpoint.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(device_ip: Option<&str>) -> RequestSettings {
        RequestSettings {
            method: reqwest::Method::POST,
            content_type: "application/json".into(),
            max_retry: 0,
            device_ip: device_ip.map(str::to_string),
        }
    }

    #[test]
    fn connection_ids_are_distinct() {
        let id1 = ConnectionId::next();
        let id2 = ConnectionId::next();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("conn-"));
    }

    #[test]
    fn configured_content_type_wins() {
        let headers: Headers = [("content-type".to_string(), "text/plain".to_string())].into();
        let map = wire_headers(&headers, &settings(None)).unwrap();
        assert_eq!(map.get_all(reqwest::header::CONTENT_TYPE).iter().count(), 1);
        assert_eq!(map[reqwest::header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn forwards_device_ip_once() {
        let map = wire_headers(&Headers::new(), &settings(Some("203.0.113.7"))).unwrap();
        assert_eq!(map["x-forwarded-for"], "203.0.113.7");

        let explicit: Headers = [(X_FORWARDED_FOR.to_string(), "198.51.100.1".to_string())].into();
        let map = wire_headers(&explicit, &settings(Some("203.0.113.7"))).unwrap();
        assert_eq!(map["x-forwarded-for"], "198.51.100.1");
    }

    #[test]
    fn rejects_invalid_header() {
        let headers: Headers = [("bad header".to_string(), "x".to_string())].into();
        let err = wire_headers(&headers, &settings(None)).unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader { ref name } if name == "bad header"));
    }

    #[test]
    fn execute_requires_configure() {
        let connection = ReqwestConnection::new(Client::new());
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let err = connection.execute(&url, "", &Headers::new()).unwrap_err();
        assert!(matches!(err, TransportError::NotConfigured));
    }
}
