//! Call execution.
//!
//! # Sequence
//! ```text
//! PreHandler::header_map
//!     → ConnectionManager::connection(HttpConfiguration)
//!     → Connection::configure
//!     → DiagnosticSink::record_request(payload)
//!     → Connection::execute(endpoint, payload, headers)
//!     → DiagnosticSink::record_response(raw)
//!     → decode(raw) → T
//! ```
//!
//! # Design Decisions
//! - No retained state between calls; only the diagnostic sink is written
//! - The request is recorded before sending so failed calls stay visible
//! - Failures are wrapped once into `ClientError`; retries live in the transport

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;

use crate::codec::{self, DecodeError};
use crate::diagnostics::{DiagnosticSink, ThreadLocalSink};
use crate::error::{ClientError, FailureCause};
use crate::http::HttpConfiguration;
use crate::observability::metrics;
use crate::prehandler::PreHandler;
use crate::transport::ConnectionManager;

/// Performs calls end to end.
#[derive(Clone)]
pub struct Executor {
    connections: Arc<dyn ConnectionManager>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Executor {
    /// An executor reporting to the calling thread's diagnostic slot.
    pub fn new(connections: Arc<dyn ConnectionManager>) -> Self {
        Self {
            connections,
            diagnostics: Arc::new(ThreadLocalSink),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Execute and decode the response into `T`.
    pub fn execute<T: DeserializeOwned>(
        &self,
        pre_handler: &dyn PreHandler,
        configuration: HttpConfiguration,
    ) -> Result<T, ClientError> {
        self.run(pre_handler, configuration, codec::from_wire::<T>)
    }

    /// Execute and ignore the response body.
    pub fn execute_discarding(
        &self,
        pre_handler: &dyn PreHandler,
        configuration: HttpConfiguration,
    ) -> Result<(), ClientError> {
        self.run(pre_handler, configuration, |_| Ok(()))
    }

    /// Execute and turn the raw response into a value with `decode`.
    pub fn run<T, F>(
        &self,
        pre_handler: &dyn PreHandler,
        configuration: HttpConfiguration,
        decode: F,
    ) -> Result<T, ClientError>
    where
        F: FnOnce(&str) -> Result<T, DecodeError>,
    {
        let start = Instant::now();
        let method = configuration.method();

        let result = self
            .exchange(pre_handler, &configuration)
            .and_then(|raw| decode(&raw).map_err(ClientError::from));

        match &result {
            Ok(_) => {
                tracing::debug!(
                    method = %method,
                    endpoint = %configuration.endpoint(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Call succeeded"
                );
                metrics::record_call(method, "success", start);
            }
            Err(e) => {
                tracing::warn!(
                    method = %method,
                    endpoint = %configuration.endpoint(),
                    error = %e,
                    "Call failed"
                );
                metrics::record_call(method, outcome(e), start);
            }
        }

        result
    }

    fn exchange(
        &self,
        pre_handler: &dyn PreHandler,
        configuration: &HttpConfiguration,
    ) -> Result<String, ClientError> {
        let headers = pre_handler.header_map();

        let mut connection = self.connections.connection(configuration)?;
        connection.configure(configuration)?;

        let payload = pre_handler.payload();
        self.diagnostics.record_request(payload);

        let response = connection.execute(configuration.endpoint(), payload, &headers)?;
        self.diagnostics.record_response(&response);
        Ok(response)
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

fn outcome(error: &ClientError) -> &'static str {
    match error.cause() {
        FailureCause::Configuration(_) => "configuration_error",
        FailureCause::Transport(_) => "transport_error",
        FailureCause::Decode(_) => "decode_error",
    }
}
