//! Transport shim between a protocol handler and an in-process application.
//!
//! # Data Flow
//! ```text
//! request bytes written by the protocol handler
//!     → hyper http1 server on the transport's half of the pipe
//!     → scope.rs (root path prefix, AppScope extension)
//!     → Application::invoke
//!     → body.rs (propagation policy for body errors)
//!     → response bytes read back by the protocol handler
//! ```
//!
//! # Design Decisions
//! - One transport per connection, one connection per request
//! - Application panics count as unhandled application errors
//! - With propagation enabled the connection is aborted and the original
//!   error is parked in the shared `ErrorSlot` for the caller
//! - With propagation disabled the caller gets an empty 500 response
//! - A request that cannot be mounted under the root path follows the same policy
//! - Keep-alive is off, so a pooling client can never send a second request
//!   down the same pipe

pub mod application;
pub mod body;
pub mod scope;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use http::{Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::io::DuplexStream;

use crate::error::BoxError;
use crate::net::{ConnectionGuard, ConnectionId, ConnectionKey, RequestHead};
use crate::observability::metrics;

pub use application::Application;
pub use body::{AppBody, AppResponseBody, ErrorSlot, ResponseBody};
pub use scope::AppScope;

/// Serves one in-memory connection by calling the application.
pub struct AppTransport<A> {
    io: DuplexStream,
    app: A,
    origin: Option<RequestHead>,
    key: ConnectionKey,
    root_path: Arc<str>,
    raise_app_exceptions: bool,
    slot: ErrorSlot,
    guard: ConnectionGuard,
}

impl<A: Application> AppTransport<A> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        io: DuplexStream,
        app: A,
        origin: Option<RequestHead>,
        key: ConnectionKey,
        root_path: Arc<str>,
        raise_app_exceptions: bool,
        slot: ErrorSlot,
        guard: ConnectionGuard,
    ) -> Self {
        Self {
            io,
            app,
            origin,
            key,
            root_path,
            raise_app_exceptions,
            slot,
            guard,
        }
    }

    /// Serve requests until the protocol handler closes its half of the pipe.
    pub async fn run(self) {
        let connection_id = self.guard.id();
        match &self.origin {
            Some(origin) => tracing::trace!(
                connection_id = %connection_id,
                method = %origin.method,
                uri = %origin.uri,
                "Transport serving request"
            ),
            None => tracing::trace!(connection_id = %connection_id, key = %self.key, "Transport serving connection"),
        }

        let service = AppService {
            app: self.app,
            key: self.key,
            root_path: self.root_path,
            raise_app_exceptions: self.raise_app_exceptions,
            slot: self.slot,
            connection_id,
        };

        if let Err(e) = http1::Builder::new()
            .keep_alive(false)
            .serve_connection(TokioIo::new(self.io), service)
            .await
        {
            tracing::trace!(connection_id = %connection_id, error = %e, "Transport connection ended with error");
        }

        drop(self.guard);
    }
}

/// hyper service translating each request into one application invocation.
struct AppService<A> {
    app: A,
    key: ConnectionKey,
    root_path: Arc<str>,
    raise_app_exceptions: bool,
    slot: ErrorSlot,
    connection_id: ConnectionId,
}

impl<A: Application> hyper::service::Service<Request<Incoming>> for AppService<A> {
    type Response = Response<AppBody>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn call(&self, request: Request<Incoming>) -> Self::Future {
        let app = self.app.clone();
        let key = self.key.clone();
        let root_path = Arc::clone(&self.root_path);
        let raise = self.raise_app_exceptions;
        let slot = self.slot.clone();
        let connection_id = self.connection_id;

        Box::pin(async move {
            let outcome = match scope::mount(request, &key, &root_path) {
                Ok(request) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                        root_path = %root_path,
                        "Invoking application"
                    );
                    match AssertUnwindSafe(app.invoke(request)).catch_unwind().await {
                        Ok(result) => result,
                        Err(panic) => Err(panic_error(panic)),
                    }
                }
                Err(e) => Err(BoxError::from(e)),
            };

            match outcome {
                Ok(response) => {
                    tracing::trace!(connection_id = %connection_id, status = %response.status(), "Application responded");
                    Ok(response.map(|body| AppBody::new(body, raise, slot)))
                }
                Err(err) => {
                    metrics::record_app_error(raise);
                    if raise {
                        tracing::debug!(connection_id = %connection_id, error = %err, "Application failed, propagating");
                        slot.set(err);
                        Err("application failed".into())
                    } else {
                        tracing::error!(connection_id = %connection_id, error = %err, "Application failed, responding 500");
                        let mut response = Response::new(AppBody::empty(slot));
                        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                        Ok(response)
                    }
                }
            }
        })
    }
}

fn panic_error(panic: Box<dyn Any + Send>) -> BoxError {
    let message = if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    format!("application panicked: {}", message).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_errors() {
        let err = panic_error(Box::new("kaboom"));
        assert_eq!(err.to_string(), "application panicked: kaboom");

        let err = panic_error(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "application panicked: owned");

        let err = panic_error(Box::new(42u8));
        assert_eq!(err.to_string(), "application panicked: unknown panic");
    }
}
