//! The calling convention for in-process applications.

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use tower::{Service, ServiceExt};

use crate::error::BoxError;
use crate::transport::body::AppResponseBody;

/// A web application that can be invoked in-process.
///
/// Implemented for every cloneable `tower::Service` taking an HTTP request and
/// returning an HTTP response, which covers axum routers and tower stacks.
/// The request head and extensions carry the scope, the request body is the
/// receive stream and the response body is the send stream.
pub trait Application: Clone + Send + Sync + 'static {
    /// Handle one request. Consumes a clone of the application.
    fn invoke(self, request: Request<Incoming>) -> BoxFuture<'static, Result<Response<AppResponseBody>, BoxError>>;
}

impl<S, B> Application for S
where
    S: Service<Request<Incoming>, Response = Response<B>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn invoke(self, request: Request<Incoming>) -> BoxFuture<'static, Result<Response<AppResponseBody>, BoxError>> {
        Box::pin(async move {
            let response = self.oneshot(request).await.map_err(|e| -> BoxError { e.into() })?;
            Ok(response.map(|body| body.map_err(|e| -> BoxError { e.into() }).boxed_unsync()))
        })
    }
}
