//! Protocol handler returned by the connector.

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::combinators::BoxBody;
use hyper::client::conn::http1;

use crate::error::{BoxError, Error, Result};
use crate::net::{AppStream, ConnectionId, ConnectionKey};
use crate::transport::{ErrorSlot, ResponseBody};

/// Request body type accepted by a protocol handler.
pub type RequestBody = BoxBody<Bytes, BoxError>;

/// Client end of one in-memory connection, with its transport attached.
///
/// Sends exactly one request; the connection closes once the response body
/// has been read or dropped.
pub struct ResponseHandler {
    sender: http1::SendRequest<RequestBody>,
    slot: ErrorSlot,
    key: ConnectionKey,
    id: ConnectionId,
}

impl ResponseHandler {
    /// Run the client handshake over `stream` and spawn the connection driver.
    pub(crate) async fn handshake(stream: AppStream, slot: ErrorSlot, key: ConnectionKey) -> Result<Self> {
        let id = stream.connection_id();
        let (sender, connection) = http1::handshake(stream).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::trace!(connection_id = %id, error = %e, "Protocol handler closed with error");
            }
        });

        Ok(Self {
            sender,
            slot,
            key,
            id,
        })
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    /// Send the request through the transport and wait for the response head.
    ///
    /// If the application failed with propagation enabled, the application's
    /// own error is returned as `Error::Application`.
    pub async fn send_request(mut self, request: Request<RequestBody>) -> Result<Response<ResponseBody>> {
        let sent = match self.sender.ready().await {
            Ok(()) => self.sender.send_request(request).await,
            Err(e) => Err(e),
        };

        match sent {
            Ok(response) => {
                let slot = self.slot;
                Ok(response.map(|body| ResponseBody::new(body, slot)))
            }
            Err(e) => Err(match self.slot.take() {
                Some(app_err) => Error::Application(app_err),
                None => Error::Protocol(e),
            }),
        }
    }
}

impl std::fmt::Debug for ResponseHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHandler")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
