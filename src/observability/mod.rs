//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! connector, transport, client produce:
//!     → tracing events (connection_id, method, path, root_path fields)
//!     → metrics.rs counters
//!
//! logging.rs installs the subscriber that consumes the events.
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
