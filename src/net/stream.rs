//! Client half of an in-memory pipe.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use hyper::rt::{Read, ReadBufCursor, Write};
use hyper_util::client::legacy::connect::{Connected, Connection};
use hyper_util::rt::TokioIo;
use tokio::io::DuplexStream;

use crate::net::connection::ConnectionId;
use crate::transport::ErrorSlot;

/// The byte stream a protocol handler reads from and writes to.
///
/// Its peer is served by an `AppTransport`; nothing touches a socket.
///
/// A stream carrying an error slot turns the transport's abort into a read
/// error wrapping the application's own error, so callers that only see IO
/// errors still find it in the `source()` chain.
#[derive(Debug)]
pub struct AppStream {
    inner: TokioIo<DuplexStream>,
    id: ConnectionId,
    slot: Option<ErrorSlot>,
}

impl AppStream {
    pub(crate) fn new(io: DuplexStream, id: ConnectionId) -> Self {
        Self {
            inner: TokioIo::new(io),
            id,
            slot: None,
        }
    }

    pub(crate) fn with_error_slot(mut self, slot: ErrorSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    /// ID of the transport serving the other end.
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }
}

impl Read for AppStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        // The slot is filled before the transport closes its half.
        if let Some(err) = this.slot.as_ref().and_then(ErrorSlot::take) {
            return Poll::Ready(Err(io::Error::other(err)));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl Write for AppStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

impl Connection for AppStream {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}
