//! Send one request through the in-process connector to a built-in echo app.
//!
//! ```text
//! app-connector --root-path /api -X POST -H 'x-trace: 1' -d 'hello' /items?page=2
//! ```

use std::path::PathBuf;

use axum::body::to_bytes;
use axum::extract::Request;
use axum::response::Json;
use axum::Router;
use clap::Parser;
use http::header::{HeaderName, HeaderValue};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use app_connector::config::{load_config, ConnectorConfig};
use app_connector::observability::{init_logging, metrics::describe_metrics};
use app_connector::{AppClient, AppScope, TracingTrace};

#[derive(Parser)]
#[command(name = "app-connector")]
#[command(about = "Send a request to an in-process echo application", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides transport.root_path
    #[arg(long)]
    root_path: Option<String>,

    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request header as `name: value`, repeatable
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,

    /// Request path or absolute URL
    #[arg(default_value = "/")]
    path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ConnectorConfig::default(),
    };
    if let Some(root_path) = cli.root_path {
        config.transport.root_path = root_path;
    }

    init_logging(&config.observability)?;
    describe_metrics();

    tracing::info!(
        root_path = %config.transport.root_path,
        raise_app_exceptions = config.transport.raise_app_exceptions,
        "Configuration loaded"
    );

    let client = AppClient::from_config(echo_app(), &config).with_trace(std::sync::Arc::new(TracingTrace));

    let mut request = http::Request::builder()
        .method(cli.method.as_str())
        .uri(cli.path.as_str());
    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header {:?} is not `name: value`", header))?;
        request = request.header(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    let request = request.body(http_body_util::Full::new(bytes::Bytes::from(
        cli.data.unwrap_or_default(),
    )))?;

    let response = client.request(request).await?;
    println!("{:?} {}", response.version(), response.status());
    for (name, value) in response.headers() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!();
    println!("{}", response.into_body().text().await?);

    Ok(())
}

/// Application that describes the request it received as JSON.
fn echo_app() -> Router {
    Router::new()
        .fallback(echo)
        .layer(TraceLayer::new_for_http())
}

async fn echo(request: Request) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let scope = parts.extensions.get::<AppScope>().cloned();
    let headers: serde_json::Map<String, Value> = parts
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or_default())))
        .collect();
    let body = to_bytes(body, 1024 * 1024).await.unwrap_or_default();

    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "root_path": scope.as_ref().map(|s| s.root_path.clone()),
        "server": scope.as_ref().map(|s| format!("{}:{}", s.server.0, s.server.1)),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}
