//! Metric names and descriptions.
//!
//! # Metrics
//! - `app_connector_transports_created_total` (counter): transports attached
//! - `app_connector_app_errors_total` (counter): unhandled application errors
//!
//! Recording goes through the `metrics` facade; installing an exporter is left
//! to the embedding program.

/// Counter of transports created, one per request.
pub const TRANSPORTS_CREATED: &str = "app_connector_transports_created_total";

/// Counter of unhandled application errors, propagated or suppressed.
pub const APP_ERRORS: &str = "app_connector_app_errors_total";

/// Register descriptions with whichever recorder is installed.
pub fn describe_metrics() {
    metrics::describe_counter!(TRANSPORTS_CREATED, "In-memory transports attached to protocol handlers");
    metrics::describe_counter!(APP_ERRORS, "Unhandled errors raised by the application");
}

pub(crate) fn record_transport_created() {
    metrics::counter!(TRANSPORTS_CREATED).increment(1);
}

pub(crate) fn record_app_error(propagated: bool) {
    let disposition = if propagated { "propagated" } else { "suppressed" };
    metrics::counter!(APP_ERRORS, "disposition" => disposition).increment(1);
}
