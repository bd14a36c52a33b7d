//! Fixture applications shared by the integration tests.

#![allow(dead_code)]

use std::convert::Infallible;

use app_connector::{AppScope, Application, BoxError};
use axum::body::to_bytes;
use axum::extract::Request;
use axum::Router;
use bytes::Bytes;
use futures_util::stream;
use http::{Response, StatusCode};
use http_body::Frame;
use http_body_util::{Full, StreamBody};
use hyper::body::Incoming;
use tower::service_fn;

/// Responds with `METHOD URI | root=ROOT | BODY`.
pub fn echo_app() -> Router {
    Router::new().fallback(|request: Request| async move {
        let (parts, body) = request.into_parts();
        let root = parts
            .extensions
            .get::<AppScope>()
            .map(|s| s.root_path.clone())
            .unwrap_or_default();
        let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
        format!(
            "{} {} | root={} | {}",
            parts.method,
            parts.uri,
            root,
            String::from_utf8_lossy(&body)
        )
    })
}

/// Echoes the request headers back as `name=value` lines.
pub fn header_app() -> Router {
    Router::new().fallback(|request: Request| async move {
        request
            .headers()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.to_str().unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Always fails with `boom` before producing a response.
pub fn failing_app() -> impl Application {
    service_fn(|_request: http::Request<Incoming>| async {
        Err::<Response<Full<Bytes>>, BoxError>("boom".into())
    })
}

/// Panics while handling the request.
pub fn panicking_app() -> impl Application {
    service_fn(|request: http::Request<Incoming>| async move {
        if request.uri().path().starts_with('/') {
            panic!("kaboom");
        }
        Ok::<_, Infallible>(Response::new(Full::new(Bytes::new())))
    })
}

/// Sends a 200 head, one chunk, then fails mid-body.
pub fn broken_stream_app() -> impl Application {
    service_fn(|_request: http::Request<Incoming>| async {
        let frames: Vec<Result<Frame<Bytes>, BoxError>> = vec![
            Ok(Frame::data(Bytes::from_static(b"partial"))),
            Err("stream broke".into()),
        ];
        let mut response = Response::new(StreamBody::new(stream::iter(frames)));
        *response.status_mut() = StatusCode::OK;
        Ok::<_, Infallible>(response)
    })
}
