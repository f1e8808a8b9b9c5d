//! Caller-facing entry point.
//!
//! # Data Flow
//! ```text
//! configure_and_execute(context, method, path, headers, payload)
//!     → ConfigurationStore::resolve(context override)
//!     → PreHandlerFactory::create(configuration, input)
//!     → HttpConfigurationBuilder::build(configuration, method, content type, pre-handler)
//!     → Executor::run → T
//! ```
//!
//! # Design Decisions
//! - Everything replaceable is injected through [`RestClientBuilder`]
//! - A `Content-Type` custom header is lifted out and becomes the content-type override
//! - The client is cheap to clone and safe to share across threads

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::codec::{self, DecodeError};
use crate::config::ConfigurationStore;
use crate::context::CallContext;
use crate::diagnostics::{DiagnosticSink, ThreadLocalSink};
use crate::error::ClientError;
use crate::executor::Executor;
use crate::http::headers::{take_header, CONTENT_TYPE};
use crate::http::{Headers, HttpConfigurationBuilder, HttpMethod};
use crate::prehandler::{PreHandlerFactory, PreHandlerInput, RestPreHandlerFactory};
use crate::transport::{ConnectionManager, ReqwestConnectionManager};

#[derive(Clone)]
enum StoreHandle {
    Global,
    Shared(Arc<ConfigurationStore>),
}

impl StoreHandle {
    fn get(&self) -> &ConfigurationStore {
        match self {
            StoreHandle::Global => ConfigurationStore::global(),
            StoreHandle::Shared(store) => store,
        }
    }
}

/// Configures and performs REST calls.
#[derive(Clone)]
pub struct RestClient {
    store: StoreHandle,
    factory: Arc<dyn PreHandlerFactory>,
    executor: Executor,
}

impl RestClient {
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    /// Perform a call and decode the response into `T`.
    pub fn configure_and_execute<T: DeserializeOwned>(
        &self,
        context: Option<&CallContext>,
        method: HttpMethod,
        resource_path: &str,
        headers: Option<Headers>,
        payload: &str,
    ) -> Result<T, ClientError> {
        self.call(context, method, resource_path, headers, payload, codec::from_wire::<T>)
    }

    /// Perform a call whose response body is not needed.
    pub fn configure_and_execute_discarding(
        &self,
        context: Option<&CallContext>,
        method: HttpMethod,
        resource_path: &str,
        headers: Option<Headers>,
        payload: &str,
    ) -> Result<(), ClientError> {
        self.call(context, method, resource_path, headers, payload, |_| Ok(()))
    }

    fn call<T, F>(
        &self,
        context: Option<&CallContext>,
        method: HttpMethod,
        resource_path: &str,
        headers: Option<Headers>,
        payload: &str,
        decode: F,
    ) -> Result<T, ClientError>
    where
        F: FnOnce(&str) -> Result<T, DecodeError>,
    {
        let configuration = self
            .store
            .get()
            .resolve(context.and_then(CallContext::configuration_override))?;

        let mut headers = headers.unwrap_or_default();
        let content_type = take_header(&mut headers, CONTENT_TYPE);

        let input = PreHandlerInput::new(resource_path, payload)
            .with_headers(headers)
            .with_content_type(content_type.clone())
            .with_access_token(context.and_then(CallContext::token).map(str::to_string))
            .with_request_id(context.and_then(CallContext::id).map(str::to_string));

        let pre_handler = self.factory.create(&configuration, &input)?;
        let http = HttpConfigurationBuilder::build(
            &configuration,
            method,
            content_type.as_deref(),
            pre_handler.as_ref(),
        )?;

        tracing::debug!(
            method = %method,
            endpoint = %http.endpoint(),
            request_id = input.request_id().unwrap_or("-"),
            "Dispatching call"
        );

        self.executor.run(pre_handler.as_ref(), http, decode)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("global_store", &matches!(self.store, StoreHandle::Global))
            .finish_non_exhaustive()
    }
}

/// Builder for [`RestClient`].
///
/// Unset parts default to the process-wide store, [`RestPreHandlerFactory`],
/// a pooled [`ReqwestConnectionManager`] and the thread-local diagnostic slot.
#[derive(Default)]
pub struct RestClientBuilder {
    store: Option<Arc<ConfigurationStore>>,
    factory: Option<Arc<dyn PreHandlerFactory>>,
    connections: Option<Arc<dyn ConnectionManager>>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl RestClientBuilder {
    pub fn store(mut self, store: Arc<ConfigurationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn pre_handler_factory(mut self, factory: Arc<dyn PreHandlerFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn connection_manager(mut self, connections: Arc<dyn ConnectionManager>) -> Self {
        self.connections = Some(connections);
        self
    }

    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    pub fn build(self) -> RestClient {
        let connections = self
            .connections
            .unwrap_or_else(|| Arc::new(ReqwestConnectionManager::new()));
        let diagnostics = self.diagnostics.unwrap_or_else(|| Arc::new(ThreadLocalSink));

        RestClient {
            store: self.store.map_or(StoreHandle::Global, StoreHandle::Shared),
            factory: self.factory.unwrap_or_else(|| Arc::new(RestPreHandlerFactory)),
            executor: Executor::new(connections).with_diagnostics(diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys::{default_map, HTTP_RETRY, SERVICE_ENDPOINT};
    use crate::config::{ConfigResult, ConfigurationError, ConfigurationMap};
    use crate::error::FailureCause;
    use crate::http::HttpConfiguration;
    use crate::prehandler::PreHandler;
    use crate::transport::{Connection, TransportError};
    use std::sync::Mutex;
    use url::Url;

    #[derive(Debug, Clone)]
    struct Seen {
        content_type: String,
        max_retry: u32,
        endpoint: String,
        headers: Headers,
    }

    #[derive(Default)]
    struct Capture(Arc<Mutex<Vec<Seen>>>);

    struct CaptureConnection {
        seen: Arc<Mutex<Vec<Seen>>>,
        configuration: Option<HttpConfiguration>,
    }

    impl ConnectionManager for Capture {
        fn connection(&self, _: &HttpConfiguration) -> Result<Box<dyn Connection>, TransportError> {
            Ok(Box::new(CaptureConnection {
                seen: Arc::clone(&self.0),
                configuration: None,
            }))
        }
    }

    impl Connection for CaptureConnection {
        fn configure(&mut self, configuration: &HttpConfiguration) -> Result<(), TransportError> {
            self.configuration = Some(configuration.clone());
            Ok(())
        }

        fn execute(&self, endpoint: &Url, _: &str, headers: &Headers) -> Result<String, TransportError> {
            let configuration = self.configuration.as_ref().ok_or(TransportError::NotConfigured)?;
            self.seen.lock().unwrap().push(Seen {
                content_type: configuration.content_type().to_string(),
                max_retry: configuration.max_retry(),
                endpoint: endpoint.to_string(),
                headers: headers.clone(),
            });
            Ok(r#"{"ok":true}"#.to_string())
        }
    }

    fn store(endpoint: &str) -> Arc<ConfigurationStore> {
        let mut defaults = default_map();
        defaults.insert(SERVICE_ENDPOINT.into(), endpoint.into());
        let store = ConfigurationStore::with_defaults(defaults.clone());
        store.initialize(defaults.into()).unwrap();
        Arc::new(store)
    }

    fn client(capture: &Capture) -> RestClient {
        RestClient::builder()
            .store(store("https://api.example.com"))
            .connection_manager(Arc::new(Capture(Arc::clone(&capture.0))))
            .build()
    }

    #[test]
    fn content_type_header_becomes_override() {
        let capture = Capture::default();
        let client = client(&capture);
        let headers: Headers = [("content-type".to_string(), "text/plain".to_string())].into();

        client
            .configure_and_execute_discarding(None, HttpMethod::Post, "v1/notes", Some(headers), "hi")
            .unwrap();

        let seen = capture.0.lock().unwrap();
        // The connection sees one content type, in its configuration and its headers.
        assert_eq!(seen[0].content_type, "text/plain");
        assert_eq!(seen[0].headers.get(CONTENT_TYPE).map(String::as_str), Some("text/plain"));
        assert!(!seen[0].headers.contains_key("content-type"));
    }

    #[test]
    fn context_supplies_token_id_and_configuration() {
        let capture = Capture::default();
        let client = client(&capture);

        let mut overrides = ConfigurationMap::new();
        overrides.insert(SERVICE_ENDPOINT.into(), "https://sandbox.example.com".into());
        overrides.insert(HTTP_RETRY.into(), "4".into());
        let context = CallContext::with_token("Bearer abc")
            .request_id("req-1")
            .configuration(overrides);

        let value: serde_json::Value = client
            .configure_and_execute(Some(&context), HttpMethod::Get, "v1/items", None, "")
            .unwrap();
        assert_eq!(value["ok"], true);

        let seen = capture.0.lock().unwrap();
        assert_eq!(seen[0].endpoint, "https://sandbox.example.com/v1/items");
        assert_eq!(seen[0].max_retry, 4);
        assert_eq!(seen[0].headers["Authorization"], "Bearer abc");
        assert_eq!(seen[0].headers["X-Request-Id"], "req-1");
    }

    #[test]
    fn injected_factory_is_used() {
        struct Fails;
        impl PreHandlerFactory for Fails {
            fn create(&self, _: &ConfigurationMap, _: &PreHandlerInput) -> ConfigResult<Box<dyn PreHandler>> {
                Err(ConfigurationError::MissingEndpoint)
            }
        }

        let capture = Capture::default();
        let client = RestClient::builder()
            .store(store("https://api.example.com"))
            .pre_handler_factory(Arc::new(Fails))
            .connection_manager(Arc::new(Capture(Arc::clone(&capture.0))))
            .build();

        let err = client
            .configure_and_execute_discarding(None, HttpMethod::Get, "x", None, "")
            .unwrap_err();
        assert!(matches!(err.cause(), FailureCause::Configuration(ConfigurationError::MissingEndpoint)));
        assert!(capture.0.lock().unwrap().is_empty());
    }
}
