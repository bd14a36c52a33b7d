//! Client facade over `AppConnector`.
//!
//! # Responsibilities
//! - Resolve relative request URIs against `http://localhost`
//! - Fill in the `Host` header from the URI authority
//! - Obtain a fresh protocol handler per request and send through it
//!
//! # Design Decisions
//! - Requests go out in origin-form, like a client talking to an origin server
//! - Trace hooks registered on the client apply to every request

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, HOST};
use http::uri::{Authority, PathAndQuery, Scheme};
use http::{Request, Response, Uri};
use http_body::Body;
use http_body_util::{BodyExt, Empty, Full};

use crate::config::{ClientTimeout, ConnectorConfig};
use crate::connector::{AppConnector, RequestTrace};
use crate::error::{BoxError, Error, Result};
use crate::net::{key::DEFAULT_HOST, RequestHead};
use crate::transport::{Application, ResponseBody};

/// HTTP client whose requests are served by an in-process application.
#[derive(Clone)]
pub struct AppClient<A> {
    connector: AppConnector<A>,
    traces: Vec<Arc<dyn RequestTrace>>,
    timeout: ClientTimeout,
}

impl<A: Application> AppClient<A> {
    pub fn new(connector: AppConnector<A>) -> Self {
        Self {
            connector,
            traces: Vec::new(),
            timeout: ClientTimeout::default(),
        }
    }

    /// Build a connector from configuration and wrap it in a client.
    pub fn from_config(app: A, config: &ConnectorConfig) -> Self {
        let mut client = Self::new(AppConnector::from_config(app, config));
        client.timeout = ClientTimeout::from(&config.timeouts);
        client
    }

    /// Register a trace hook for every subsequent request.
    pub fn with_trace(mut self, trace: Arc<dyn RequestTrace>) -> Self {
        self.traces.push(trace);
        self
    }

    /// Set the timeout handed to the connector. Never enforced.
    pub fn with_timeout(mut self, timeout: ClientTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connector(&self) -> &AppConnector<A> {
        &self.connector
    }

    /// Send a request to the application.
    pub async fn request<B>(&self, request: Request<B>) -> Result<Response<ResponseBody>>
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let (mut parts, body) = request.into_parts();

        let uri = absolute_uri(parts.uri)?;
        if !parts.headers.contains_key(HOST) {
            if let Some(authority) = uri.authority() {
                let value = HeaderValue::from_str(authority.as_str())
                    .map_err(|e| Error::InvalidRequest(e.to_string()))?;
                parts.headers.insert(HOST, value);
            }
        }

        let head = RequestHead::new(parts.method.clone(), uri.clone());
        parts.uri = origin_form(&uri)?;

        tracing::debug!(method = %head.method, uri = %head.uri, "Sending request to application");

        let handler = self.connector.connect(&head, &self.traces, &self.timeout).await?;
        let body = body.map_err(|e| -> BoxError { e.into() }).boxed();
        handler.send_request(Request::from_parts(parts, body)).await
    }

    /// Send a GET request with an empty body.
    pub async fn get(&self, uri: &str) -> Result<Response<ResponseBody>> {
        let request = Request::get(uri).body(Empty::<Bytes>::new())?;
        self.request(request).await
    }

    /// Send a POST request with the given body.
    pub async fn post(&self, uri: &str, body: impl Into<Bytes>) -> Result<Response<ResponseBody>> {
        let request = Request::post(uri).body(Full::new(body.into()))?;
        self.request(request).await
    }
}

impl<A> std::fmt::Debug for AppClient<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppClient")
            .field("connector", &self.connector)
            .field("traces", &self.traces.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Resolve a possibly relative URI against `http://localhost`.
fn absolute_uri(uri: Uri) -> Result<Uri> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Ok(uri);
    }

    let mut parts = uri.into_parts();
    if parts.scheme.is_none() {
        parts.scheme = Some(Scheme::HTTP);
    }
    if parts.authority.is_none() {
        parts.authority = Some(Authority::from_static(DEFAULT_HOST));
    }
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Uri::from_parts(parts).map_err(|e| Error::InvalidRequest(e.to_string()))
}

fn origin_form(uri: &Uri) -> Result<Uri> {
    let path_and_query = uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));
    Ok(Uri::builder().path_and_query(path_and_query).build()?)
}
