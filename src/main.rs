//! Bridge CLI entry point.
//!
//! Runs the bridge as a reverse proxy in front of a legacy system,
//! validates configuration, or executes a single task file through the
//! configured adapter.

use a2a_bridge::{
    BridgeConfig, LegacyAdapter, LegacyRequest, RequestOutcome, RestAdapter, TransformEngine,
    TransformPipeline,
};
use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use clap::Parser;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "a2a-bridge")]
#[command(
    author,
    version,
    about = "Bridge between the A2A task protocol and legacy systems"
)]
struct Args {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, env = "A2A_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8082", env = "A2A_BRIDGE_LISTEN")]
    listen: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration and exit.
    #[arg(long)]
    validate: bool,

    /// Transform one task file, execute it through the adapter and print
    /// the resulting task.
    #[arg(long, value_name = "TASK_FILE")]
    once: Option<PathBuf>,
}

fn print_example_config() {
    let example = r#"# A2A Bridge Configuration Example

adapter:
  # Adapter kind: rest, soap, db, file
  type: rest
  name: crm-legacy
  # ${NAME} placeholders resolve against variables, which are seeded
  # from A2A_* / CONNECTOR_* environment variables
  baseUrl: "${A2A_LEGACY_URL}"
  auth:
    type: token
    token: "${A2A_LEGACY_TOKEN}"
  headers:
    X-Source: a2a-bridge

mappings:
  # First matching intent wins; patterns match the lower-cased task text
  - intentPattern: "get customer data"
    endpoint: "/customers/{id}"
    method: GET
    parameterMappings:
      - source: text
        pattern: "ID:\\s*(\\w+)"
        target: id
      - source: metadata.agent
        target: requestedBy
        default: unknown-agent
    responseTransform:
      template: "Customer ${result.name}"

transforms:
  a2aToLegacy:
    - source: metadata.priority
      target: meta.priority
  legacyToA2a:
    - source: meta.requestId
      target: metadata.requestId
      template: "legacy-{value}"

variables:
  A2A_LEGACY_URL: "http://localhost:8080"
"#;
    println!("{}", example);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    if args.example_config {
        print_example_config();
        return Ok(());
    }

    let config_path = args
        .config
        .as_deref()
        .context("a configuration file is required (--config or A2A_BRIDGE_CONFIG)")?;
    let config = BridgeConfig::load_from_path(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let engine = Arc::new(
        TransformEngine::compile(&config).context("failed to compile configuration")?,
    );

    if args.validate {
        info!("configuration is valid");
        return Ok(());
    }

    let pipeline = Arc::new(TransformPipeline::new(engine, &config.adapter));

    if let Some(task_file) = &args.once {
        return run_once(&pipeline, &config, task_file).await;
    }

    serve(pipeline, &config, &args.listen).await
}

/// Push one task file through the full request/execute/response cycle.
async fn run_once(
    pipeline: &TransformPipeline,
    config: &BridgeConfig,
    task_file: &Path,
) -> Result<()> {
    let body = std::fs::read(task_file)
        .with_context(|| format!("failed to read {}", task_file.display()))?;

    let decision = pipeline.intercept_request(&body);
    let transformed = match decision.outcome {
        RequestOutcome::Rewritten(transformed) => transformed,
        RequestOutcome::PassThrough { reason } => {
            anyhow::bail!("task was not transformed ({:?})", reason)
        }
    };
    let request: LegacyRequest = serde_json::from_slice(&transformed.body)
        .context("transformed request did not round-trip")?;

    let adapter = RestAdapter::new(&config.adapter)?;
    adapter.initialize().await?;
    let legacy_response = adapter.execute_task(&request).await?;
    adapter.close().await?;

    let response = pipeline.intercept_response(&serde_json::to_vec(&legacy_response)?)?;
    let task: serde_json::Value = serde_json::from_slice(&response.body)?;
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}

#[derive(Clone)]
struct ProxyState {
    pipeline: Arc<TransformPipeline>,
    client: reqwest::Client,
    base_url: String,
}

/// Serve the bridge as a reverse proxy in front of the legacy system.
async fn serve(pipeline: Arc<TransformPipeline>, config: &BridgeConfig, listen: &str) -> Result<()> {
    let state = ProxyState {
        pipeline,
        client: reqwest::Client::new(),
        base_url: config.adapter.base_url.trim_end_matches('/').to_string(),
    };

    let app = Router::new().fallback(forward).with_state(state);

    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;
    info!(%listen, base_url = %config.adapter.base_url, "bridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

async fn forward(State(state): State<ProxyState>, request: Request) -> Response {
    match forward_inner(&state, request).await {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, "exchange failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": error.to_string()})),
            )
                .into_response()
        }
    }
}

async fn forward_inner(state: &ProxyState, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .context("failed to buffer request body")?;

    let decision = state.pipeline.intercept_request(&body);
    let outbound = match decision.outcome {
        RequestOutcome::Rewritten(transformed) => transformed.body,
        RequestOutcome::PassThrough { .. } => body.to_vec(),
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.base_url, path_and_query);

    let mut headers = parts.headers.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    for (name, value) in &decision.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name {:?}", name))?;
        let header_value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for header {:?}", name))?;
        headers.insert(header_name, header_value);
    }

    let upstream = state
        .client
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(outbound)
        .send()
        .await
        .context("legacy request failed")?;

    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();
    let upstream_body = upstream
        .bytes()
        .await
        .context("failed to read legacy response")?;

    let response = state.pipeline.intercept_response(&upstream_body)?;

    let mut reply = Response::new(Body::from(response.body));
    *reply.status_mut() = status;
    let reply_headers = reply.headers_mut();
    for (name, value) in upstream_headers.iter() {
        if name == header::CONTENT_LENGTH || name == header::TRANSFER_ENCODING {
            continue;
        }
        reply_headers.insert(name.clone(), value.clone());
    }
    reply_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    for (name, value) in &response.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name {:?}", name))?;
        let header_value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for header {:?}", name))?;
        reply_headers.insert(header_name, header_value);
    }

    Ok(reply)
}
