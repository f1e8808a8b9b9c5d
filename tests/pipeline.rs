//! End-to-end calls through `RestClient` against an in-process backend.

mod common;

use std::io::Write;
use std::sync::Arc;
use std::thread;

use common::MockBackend;
use rest_pipeline::config::keys::{mode_endpoint_key, HTTP_RETRY, MODE, SERVICE_ENDPOINT};
use rest_pipeline::{
    diagnostics, CallContext, ConfigSource, ConfigurationError, ConfigurationMap, ConfigurationStore, FailureCause,
    Headers, HttpMethod, RestClient,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Payment {
    id: String,
    state: String,
}

fn client_with(entries: &[(&str, &str)]) -> RestClient {
    let map: ConfigurationMap = entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let store = ConfigurationStore::new();
    store.initialize(map.into()).unwrap();
    RestClient::builder().store(Arc::new(store)).build()
}

#[test]
fn post_decodes_typed_response() {
    let backend = MockBackend::scripted(&[(201, r#"{"id":"PAY-1","state":"approved"}"#)]);
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str())]);
    let context = CallContext::with_token("Bearer A015").request_id("req-42");

    let payment: Payment = client
        .configure_and_execute(Some(&context), HttpMethod::Post, "v1/payments", None, r#"{"amount":"1.00"}"#)
        .unwrap();

    assert_eq!(payment.id, "PAY-1");
    assert_eq!(payment.state, "approved");

    let received = backend.received();
    assert_eq!(received.len(), 1);
    let request = &received[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1/payments");
    assert_eq!(request.body, r#"{"amount":"1.00"}"#);
    assert_eq!(request.headers["authorization"], "Bearer A015");
    assert_eq!(request.headers["x-request-id"], "req-42");
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["accept"], "application/json");
    assert!(request.headers["user-agent"].starts_with("rest-pipeline/"));
}

#[test]
fn success_records_exact_payload_and_response() {
    diagnostics::clear();
    let body = r#"{"id":"PAY-2","state":"created"}"#;
    let backend = MockBackend::scripted(&[(200, body)]);
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str())]);

    let _: Payment = client
        .configure_and_execute(None, HttpMethod::Post, "v1/payments", None, r#"{"intent":"sale"}"#)
        .unwrap();

    assert_eq!(diagnostics::last_request().as_deref(), Some(r#"{"intent":"sale"}"#));
    assert_eq!(diagnostics::last_response().as_deref(), Some(body));
}

#[test]
fn server_error_is_retried_then_reported() {
    diagnostics::clear();
    let backend = MockBackend::scripted(&[(500, r#"{"name":"INTERNAL_SERVICE_ERROR"}"#)]);
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str()), (HTTP_RETRY, "2")]);

    let err = client
        .configure_and_execute::<Payment>(None, HttpMethod::Post, "v1/payments", None, "{}")
        .unwrap_err();

    assert_eq!(backend.received().len(), 3);
    assert!(matches!(err.cause(), FailureCause::Transport(_)));
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.response_body(), Some(r#"{"name":"INTERNAL_SERVICE_ERROR"}"#));
    assert!(err.message().contains("500"));
    assert_eq!(diagnostics::last_request().as_deref(), Some("{}"));
    assert_eq!(diagnostics::last_response(), None);
}

#[test]
fn transient_failure_recovers_within_budget() {
    let backend = MockBackend::scripted(&[(503, "busy"), (200, r#"{"id":"PAY-3","state":"approved"}"#)]);
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str()), (HTTP_RETRY, "1")]);

    let payment: Payment = client
        .configure_and_execute(None, HttpMethod::Get, "v1/payments/PAY-3", None, "")
        .unwrap();

    assert_eq!(payment.id, "PAY-3");
    assert_eq!(backend.received().len(), 2);
}

#[test]
fn client_error_is_not_retried() {
    let backend = MockBackend::scripted(&[(400, r#"{"name":"VALIDATION_ERROR"}"#)]);
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str()), (HTTP_RETRY, "3")]);

    let err = client
        .configure_and_execute_discarding(None, HttpMethod::Post, "v1/payments", None, "{}")
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(backend.received().len(), 1);
}

#[test]
fn undecodable_response_is_decode_failure() {
    let backend = MockBackend::scripted(&[(200, "<html>maintenance</html>")]);
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str())]);

    let err = client
        .configure_and_execute::<Payment>(None, HttpMethod::Get, "v1/payments/x", None, "")
        .unwrap_err();

    assert!(matches!(err.cause(), FailureCause::Decode(_)));
    assert_eq!(diagnostics::last_response().as_deref(), Some("<html>maintenance</html>"));
}

#[test]
fn discarding_call_ignores_body() {
    let backend = MockBackend::scripted(&[(204, "")]);
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str())]);

    client
        .configure_and_execute_discarding(None, HttpMethod::Delete, "v1/webhooks/WH-1", None, "")
        .unwrap();
    assert_eq!(backend.received()[0].method, "DELETE");
}

#[test]
fn content_type_header_overrides_json() {
    let backend = MockBackend::echo();
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str())]);
    let mut headers = Headers::new();
    headers.insert("Content-Type".into(), "application/x-www-form-urlencoded".into());
    headers.insert("PayPal-Partner-Attribution-Id".into(), "partner".into());

    client
        .configure_and_execute_discarding(None, HttpMethod::Post, "v1/oauth2/token", Some(headers), "grant_type=x")
        .unwrap();

    let request = &backend.received()[0];
    assert_eq!(request.headers["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(request.headers["paypal-partner-attribution-id"], "partner");
}

#[test]
fn missing_endpoint_fails_before_sending() {
    diagnostics::clear();
    let backend = MockBackend::echo();
    let client = client_with(&[]);

    let err = client
        .configure_and_execute::<Value>(None, HttpMethod::Get, "v1/x", None, "")
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        FailureCause::Configuration(ConfigurationError::MissingEndpoint)
    ));
    assert!(backend.received().is_empty());
    assert_eq!(diagnostics::last_request(), None);
}

#[test]
fn unreachable_host_is_transport_failure() {
    diagnostics::clear();
    let client = client_with(&[(SERVICE_ENDPOINT, "http://127.0.0.1:1"), (HTTP_RETRY, "0")]);

    let err = client
        .configure_and_execute::<Value>(None, HttpMethod::Post, "v1/x", None, "{\"a\":1}")
        .unwrap_err();

    assert!(matches!(err.cause(), FailureCause::Transport(_)));
    assert_eq!(err.status(), None);
    assert_eq!(diagnostics::last_request().as_deref(), Some("{\"a\":1}"));
    assert_eq!(diagnostics::last_response(), None);
}

#[test]
fn mode_selects_endpoint() {
    let backend = MockBackend::echo();
    let sandbox_key = mode_endpoint_key("sandbox");
    let client = client_with(&[(MODE, "sandbox"), (sandbox_key.as_str(), backend.url().as_str())]);

    let value: Value = client
        .configure_and_execute(None, HttpMethod::Post, "v1/echo", None, r#"{"n":1}"#)
        .unwrap();

    assert_eq!(value["n"], 1);
}

#[test]
fn context_configuration_overrides_store() {
    let live = MockBackend::echo();
    let sandbox = MockBackend::echo();
    let client = client_with(&[(SERVICE_ENDPOINT, live.url().as_str())]);

    let mut overrides = ConfigurationMap::new();
    overrides.insert(SERVICE_ENDPOINT.into(), sandbox.url());
    let context = CallContext::new().configuration(overrides);

    client
        .configure_and_execute_discarding(Some(&context), HttpMethod::Get, "v1/ping", None, "")
        .unwrap();

    assert!(live.received().is_empty());
    assert_eq!(sandbox.received().len(), 1);
    // A fresh context always carries a generated request id.
    assert!(!sandbox.received()[0].headers["x-request-id"].is_empty());
}

#[test]
fn properties_file_drives_store() {
    let backend = MockBackend::echo();
    let mut file = tempfile::Builder::new().suffix(".properties").tempfile().unwrap();
    writeln!(file, "# sdk settings").unwrap();
    writeln!(file, "service.EndPoint={}", backend.url()).unwrap();
    writeln!(file, "http.Retry : 0").unwrap();

    let store = ConfigurationStore::new();
    store.initialize(ConfigSource::file(file.path())).unwrap();
    let client = RestClient::builder().store(Arc::new(store)).build();

    let value: Value = client
        .configure_and_execute(None, HttpMethod::Put, "v1/items/7", None, r#"{"qty":2}"#)
        .unwrap();
    assert_eq!(value["qty"], 2);
}

#[test]
fn concurrent_threads_keep_their_own_diagnostics() {
    let backend = MockBackend::echo();
    let client = client_with(&[(SERVICE_ENDPOINT, backend.url().as_str())]);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                let payload = format!(r#"{{"worker":{i}}}"#);
                for _ in 0..5 {
                    let value: Value = client
                        .configure_and_execute(None, HttpMethod::Post, "v1/echo", None, &payload)
                        .unwrap();
                    assert_eq!(value["worker"], i);
                    assert_eq!(diagnostics::last_request().as_deref(), Some(payload.as_str()));
                    assert_eq!(diagnostics::last_response().as_deref(), Some(payload.as_str()));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(backend.received().len(), 40);
}
