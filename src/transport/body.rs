//! Response bodies on both ends of the pipe.
//!
//! # Responsibilities
//! - Carry an application error from the transport to the caller (`ErrorSlot`)
//! - Apply the propagation policy to errors raised mid-body (`AppBody`)
//! - Surface recorded application errors on the client side (`ResponseBody`)

use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::BodyExt;
use hyper::body::Incoming;

use crate::error::{BoxError, Error, Result};
use crate::observability::metrics;

/// Type-erased body returned by an application.
pub type AppResponseBody = UnsyncBoxBody<Bytes, BoxError>;

/// Holds the first unhandled application error seen on a connection.
///
/// Shared between a transport and the protocol handler it is attached to.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot(Arc<Mutex<Option<BoxError>>>);

impl ErrorSlot {
    /// Record an error. Returns false if one was already recorded.
    pub fn set(&self, err: BoxError) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_some() {
            return false;
        }
        *slot = Some(err);
        true
    }

    /// Take the recorded error, leaving the slot empty.
    pub fn take(&self) -> Option<BoxError> {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).take()
    }

    pub fn is_set(&self) -> bool {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).is_some()
    }
}

/// Application body as written into the pipe.
pub struct AppBody {
    inner: Option<AppResponseBody>,
    raise_app_exceptions: bool,
    slot: ErrorSlot,
}

impl AppBody {
    pub(crate) fn new(inner: AppResponseBody, raise_app_exceptions: bool, slot: ErrorSlot) -> Self {
        Self {
            inner: Some(inner),
            raise_app_exceptions,
            slot,
        }
    }

    /// Body of the fallback response sent when an error is suppressed.
    pub(crate) fn empty(slot: ErrorSlot) -> Self {
        Self {
            inner: None,
            raise_app_exceptions: false,
            slot,
        }
    }
}

impl Body for AppBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<std::result::Result<Frame<Bytes>, BoxError>>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match ready!(Pin::new(inner).poll_frame(cx)) {
            Some(Ok(frame)) => Poll::Ready(Some(Ok(frame))),
            Some(Err(err)) => {
                this.inner = None;
                metrics::record_app_error(this.raise_app_exceptions);
                if this.raise_app_exceptions {
                    tracing::debug!(error = %err, "Application failed while streaming body");
                    this.slot.set(err);
                    Poll::Ready(Some(Err("application failed while streaming body".into())))
                } else {
                    tracing::error!(error = %err, "Application failed while streaming body, truncating");
                    Poll::Ready(None)
                }
            }
            None => {
                this.inner = None;
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.as_ref().map_or(true, |b| b.is_end_stream())
    }

    fn size_hint(&self) -> SizeHint {
        self.inner
            .as_ref()
            .map_or_else(|| SizeHint::with_exact(0), |b| b.size_hint())
    }
}

/// Body of a response received through the connector.
#[derive(Debug)]
pub struct ResponseBody {
    inner: Incoming,
    slot: ErrorSlot,
}

impl ResponseBody {
    pub(crate) fn new(inner: Incoming, slot: ErrorSlot) -> Self {
        Self { inner, slot }
    }

    /// Read the whole body into memory.
    pub async fn collect_bytes(self) -> Result<Bytes> {
        Ok(self.collect().await?.to_bytes())
    }

    /// Read the whole body as UTF-8 text, replacing invalid sequences.
    pub async fn text(self) -> Result<String> {
        let bytes = self.collect_bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>>>> {
        let this = self.get_mut();
        match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
            Some(Ok(frame)) => Poll::Ready(Some(Ok(frame))),
            Some(Err(err)) => {
                let err = match this.slot.take() {
                    Some(app_err) => Error::Application(app_err),
                    None => Error::Protocol(err),
                };
                Poll::Ready(Some(Err(err)))
            }
            None => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
