//! `rest-pipeline` command-line client.
//!
//! Performs one call through the pipeline and prints the decoded JSON
//! response. Configuration comes from `--config` (properties or TOML) with
//! `--set key=value` entries layered on top.
//!
//! ```text
//! rest-pipeline --config sdk.properties --token "Bearer abc" POST v1/payments --data '{"amount":"1.00"}'
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;

use rest_pipeline::config::loader;
use rest_pipeline::diagnostics;
use rest_pipeline::http::headers::insert_header;
use rest_pipeline::observability::logging;
use rest_pipeline::{CallContext, ConfigSource, ConfigurationMap, ConfigurationStore, Headers, HttpMethod, RestClient};

#[derive(Parser)]
#[command(name = "rest-pipeline")]
#[command(version, about = "Perform a configured REST call", long_about = None)]
struct Cli {
    /// Configuration file (.properties or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Value for the Authorization header
    #[arg(short, long)]
    token: Option<String>,

    /// Request id sent as X-Request-Id (generated when omitted)
    #[arg(long)]
    request_id: Option<String>,

    /// Configuration entry layered over the file, e.g. http.Retry=3
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_entry)]
    entries: Vec<(String, String)>,

    /// Extra header, e.g. 'Accept-Language: en'
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Request payload
    #[arg(short, long, default_value = "")]
    data: String,

    /// Print the recorded request and response to stderr
    #[arg(long)]
    diagnostics: bool,

    /// HTTP method
    method: HttpMethod,

    /// Resource path relative to the service endpoint
    path: String,
}

fn parse_entry(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected 'Name: value', got '{raw}'"))
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_logging(logging::DEFAULT_DIRECTIVE);
    let cli = Cli::parse();

    let mut configuration = match &cli.config {
        Some(path) => loader::load(ConfigSource::file(path))?,
        None => ConfigurationMap::new(),
    };
    configuration.extend(cli.entries);

    let store = ConfigurationStore::new();
    store.initialize(configuration.into())?;
    let client = RestClient::builder().store(Arc::new(store)).build();

    let mut context = CallContext::new();
    if let Some(token) = cli.token {
        context = context.access_token(token);
    }
    if let Some(id) = cli.request_id {
        context = context.request_id(id);
    }

    let mut headers = Headers::new();
    for (name, value) in &cli.headers {
        insert_header(&mut headers, name, value);
    }

    tracing::info!(method = %cli.method, path = %cli.path, "Calling service");
    let result = client.configure_and_execute::<Value>(Some(&context), cli.method, &cli.path, Some(headers), &cli.data);

    if cli.diagnostics {
        let recorded = diagnostics::snapshot();
        eprintln!("request:  {}", recorded.last_request.as_deref().unwrap_or("<none>"));
        eprintln!("response: {}", recorded.last_response.as_deref().unwrap_or("<none>"));
    }

    let value = result?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
