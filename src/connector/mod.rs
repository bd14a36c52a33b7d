//! Connector adapter.
//!
//! # Data Flow
//! ```text
//! AppConnector::connect(request head)
//!     → available_connections (always 1)
//!     → get (always None, nothing is cached)
//!     → create_connection
//!         → open: duplex pipe + AppTransport spawned on the server half
//!         → handler.rs: hyper http1 handshake on the client half
//!     → ResponseHandler with its transport attached
//! ```
//!
//! The connector is also a `tower::Service<Uri>`, so it can back a
//! `hyper_util` legacy `Client` directly. Streams handed out that way carry
//! the error slot, and a propagated application error comes back as the
//! source of the client's IO error.
//!
//! # Design Decisions
//! - Stateless across requests apart from fixed configuration and counters
//! - Pool queries are fixed-value stubs: one slot free, nothing cached
//! - Timeouts and trace hooks are accepted; timeouts are never enforced

pub mod handler;
pub mod trace;

use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use http::Uri;

use crate::config::{ClientTimeout, ConnectorConfig};
use crate::error::{Error, Result};
use crate::net::{AppStream, ConnectionKey, ConnectionTracker, RequestHead};
use crate::observability::metrics;
use crate::transport::{AppTransport, Application, ErrorSlot};

pub use handler::{RequestBody, ResponseHandler};
pub use trace::{RequestTrace, TracingTrace};

const DEFAULT_PIPE_BUFFER_BYTES: usize = 64 * 1024;

/// Connector that hands every request to an in-process application.
#[derive(Clone)]
pub struct AppConnector<A> {
    app: A,
    root_path: Arc<str>,
    raise_app_exceptions: bool,
    pipe_buffer_bytes: usize,
    tracker: ConnectionTracker,
}

impl<A: Application> AppConnector<A> {
    /// Create a connector with an empty root path that propagates application errors.
    pub fn new(app: A) -> Self {
        Self {
            app,
            root_path: Arc::from(""),
            raise_app_exceptions: true,
            pipe_buffer_bytes: DEFAULT_PIPE_BUFFER_BYTES,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Create a connector from loaded configuration.
    pub fn from_config(app: A, config: &ConnectorConfig) -> Self {
        Self::new(app)
            .with_root_path(config.transport.root_path.as_str())
            .raise_app_exceptions(config.transport.raise_app_exceptions)
            .with_pipe_buffer(config.transport.pipe_buffer_bytes)
    }

    /// Mount the application under `root_path`.
    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = Arc::from(root_path.into());
        self
    }

    /// Choose whether unhandled application errors reach the caller.
    pub fn raise_app_exceptions(mut self, raise: bool) -> Self {
        self.raise_app_exceptions = raise;
        self
    }

    /// Set the per-direction capacity of each in-memory pipe.
    pub fn with_pipe_buffer(mut self, bytes: usize) -> Self {
        self.pipe_buffer_bytes = bytes.max(1);
        self
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn raises_app_exceptions(&self) -> bool {
        self.raise_app_exceptions
    }

    /// Transport counters shared by every clone of this connector.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Number of connections that may be opened for `key` right now. Always 1.
    pub fn available_connections(&self, _key: &ConnectionKey) -> usize {
        1
    }

    /// Look up a cached connection for `key`. Always `None`.
    pub fn get(&self, _key: &ConnectionKey) -> Option<ResponseHandler> {
        None
    }

    /// Obtain a protocol handler for a request, firing trace hooks on the way.
    pub async fn connect(
        &self,
        head: &RequestHead,
        traces: &[Arc<dyn RequestTrace>],
        timeout: &ClientTimeout,
    ) -> Result<ResponseHandler> {
        let key = head.key();
        tracing::trace!(key = %key, available = self.available_connections(&key), "Acquiring connection");

        if let Some(handler) = self.get(&key) {
            for trace in traces {
                trace.on_connection_reuseconn(&key, handler.connection_id());
            }
            return Ok(handler);
        }

        for trace in traces {
            trace.on_connection_create_start(&key);
        }
        let handler = self.create_connection(head, traces, timeout).await?;
        for trace in traces {
            trace.on_connection_create_end(&key, handler.connection_id());
        }
        Ok(handler)
    }

    /// Build a protocol handler with a fresh transport attached.
    ///
    /// `traces` and `timeout` are accepted for interface parity only.
    pub async fn create_connection(
        &self,
        head: &RequestHead,
        _traces: &[Arc<dyn RequestTrace>],
        timeout: &ClientTimeout,
    ) -> Result<ResponseHandler> {
        let key = head.key();
        if timeout.total.is_some() || timeout.connect.is_some() || timeout.read.is_some() {
            tracing::trace!(key = %key, ?timeout, "Ignoring timeout for in-process connection");
        }
        let (stream, slot) = self.open(Some(head.clone()), &key);
        ResponseHandler::handshake(stream, slot, key).await
    }

    /// Open a pipe and spawn a transport on its server half.
    fn open(&self, origin: Option<RequestHead>, key: &ConnectionKey) -> (AppStream, ErrorSlot) {
        let (client_io, server_io) = tokio::io::duplex(self.pipe_buffer_bytes);
        let guard = self.tracker.track();
        let id = guard.id();
        let slot = ErrorSlot::default();

        let transport = AppTransport::new(
            server_io,
            self.app.clone(),
            origin,
            key.clone(),
            Arc::clone(&self.root_path),
            self.raise_app_exceptions,
            slot.clone(),
            guard,
        );
        tokio::spawn(transport.run());

        metrics::record_transport_created();
        tracing::debug!(connection_id = %id, key = %key, root_path = %self.root_path, "Transport attached");

        (AppStream::new(client_io, id), slot)
    }
}

impl<A> std::fmt::Debug for AppConnector<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConnector")
            .field("root_path", &self.root_path)
            .field("raise_app_exceptions", &self.raise_app_exceptions)
            .field("pipe_buffer_bytes", &self.pipe_buffer_bytes)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl<A: Application> tower::Service<Uri> for AppConnector<A> {
    type Response = AppStream;
    type Error = Error;
    type Future = Ready<Result<AppStream>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let key = ConnectionKey::from_uri(&uri);
        let (stream, slot) = self.open(None, &key);
        ready(Ok(stream.with_error_slot(slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Method, Request, Response};
    use http_body_util::Full;
    use hyper::body::Incoming;
    use std::convert::Infallible;

    #[derive(Debug, Default)]
    struct CountingTrace {
        started: std::sync::atomic::AtomicUsize,
        ended: std::sync::atomic::AtomicUsize,
    }

    impl RequestTrace for CountingTrace {
        fn on_connection_create_start(&self, _key: &ConnectionKey) {
            self.started.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        fn on_connection_create_end(&self, _key: &ConnectionKey, _id: crate::net::ConnectionId) {
            self.ended.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    fn ok_app() -> impl Application {
        tower::service_fn(|_req: Request<Incoming>| async {
            Ok::<_, Infallible>(Response::new(Full::new(Bytes::from_static(b"ok"))))
        })
    }

    fn head(uri: &str) -> RequestHead {
        RequestHead::new(Method::GET, uri.parse().unwrap())
    }

    #[test]
    fn pool_queries_are_fixed() {
        let connector = AppConnector::new(ok_app());
        let key = ConnectionKey::from_uri(&"http://localhost/".parse().unwrap());
        for _ in 0..3 {
            assert_eq!(connector.available_connections(&key), 1);
            assert!(connector.get(&key).is_none());
        }
    }

    #[test]
    fn builder_applies_configuration() {
        let mut config = ConnectorConfig::default();
        config.transport.root_path = "/api".to_string();
        config.transport.raise_app_exceptions = false;

        let connector = AppConnector::from_config(ok_app(), &config);
        assert_eq!(connector.root_path(), "/api");
        assert!(!connector.raises_app_exceptions());
    }

    #[tokio::test]
    async fn create_connection_attaches_fresh_transport() {
        let connector = AppConnector::new(ok_app());
        let first = connector
            .create_connection(&head("/a"), &[], &ClientTimeout::default())
            .await
            .unwrap();
        let second = connector
            .create_connection(&head("/b"), &[], &ClientTimeout::default())
            .await
            .unwrap();

        assert_ne!(first.connection_id(), second.connection_id());
        assert_eq!(connector.tracker().created(), 2);
    }

    #[tokio::test]
    async fn connect_fires_create_hooks() {
        let connector = AppConnector::new(ok_app());
        let counting = Arc::new(CountingTrace::default());
        let traces: Vec<Arc<dyn RequestTrace>> = vec![counting.clone(), Arc::new(TracingTrace)];

        let handler = connector
            .connect(&head("http://app.local/"), &traces, &ClientTimeout::default())
            .await
            .unwrap();
        assert_eq!(handler.key().host, "app.local");
        assert_eq!(counting.started.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(counting.ended.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
