//! Connection trace hooks.
//!
//! Callbacks fired by `AppConnector::connect` around connection creation,
//! mirroring the hooks a pooled HTTP client exposes. Queue and reuse hooks
//! exist for parity but never fire: nothing is queued and nothing is reused.

use crate::net::{ConnectionId, ConnectionKey};

/// Observer of connector events for a single request.
pub trait RequestTrace: Send + Sync + std::fmt::Debug {
    /// A request started waiting for a free connection slot.
    fn on_connection_queued_start(&self, _key: &ConnectionKey) {}

    /// A request stopped waiting for a free connection slot.
    fn on_connection_queued_end(&self, _key: &ConnectionKey) {}

    /// A new connection is about to be created.
    fn on_connection_create_start(&self, _key: &ConnectionKey) {}

    /// A new connection was created and its transport attached.
    fn on_connection_create_end(&self, _key: &ConnectionKey, _id: ConnectionId) {}

    /// A cached connection was reused.
    fn on_connection_reuseconn(&self, _key: &ConnectionKey, _id: ConnectionId) {}
}

/// Trace hook that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTrace;

impl RequestTrace for TracingTrace {
    fn on_connection_queued_start(&self, key: &ConnectionKey) {
        tracing::debug!(key = %key, "Connection queued");
    }

    fn on_connection_queued_end(&self, key: &ConnectionKey) {
        tracing::debug!(key = %key, "Connection dequeued");
    }

    fn on_connection_create_start(&self, key: &ConnectionKey) {
        tracing::debug!(key = %key, "Creating connection");
    }

    fn on_connection_create_end(&self, key: &ConnectionKey, id: ConnectionId) {
        tracing::debug!(key = %key, connection_id = %id, "Connection created");
    }

    fn on_connection_reuseconn(&self, key: &ConnectionKey, id: ConnectionId) {
        tracing::debug!(key = %key, connection_id = %id, "Connection reused");
    }
}
