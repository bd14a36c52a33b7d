//! In-process HTTP connector.
//!
//! Routes HTTP client requests straight into a `tower::Service` application
//! over an in-memory pipe, with no socket, server process or network.
//!
//! ```text
//!   AppClient::request
//!        │
//!        ▼
//!   AppConnector::connect ──▶ ResponseHandler (hyper http1 client)
//!        │                          │  bytes
//!        │ spawns                   ▼
//!        └──────────────▶ AppTransport (hyper http1 server)
//!                                   │  Request + AppScope
//!                                   ▼
//!                              Application
//! ```

pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod net;
pub mod observability;
pub mod transport;

pub use client::AppClient;
pub use config::{ClientTimeout, ConnectorConfig};
pub use connector::{AppConnector, RequestTrace, ResponseHandler, TracingTrace};
pub use error::{BoxError, Error, Result};
pub use net::{ConnectionKey, RequestHead};
pub use transport::{AppScope, Application, ResponseBody};
