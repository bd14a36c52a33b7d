//! In-memory network layer.
//!
//! # Data Flow
//! ```text
//! AppConnector opens a connection
//!     → tokio::io::duplex pipe (client half, server half)
//!     → stream.rs wraps the client half for hyper
//!     → connection.rs tracks the transport holding the server half
//!     → key.rs names the destination for logs and trace hooks
//! ```
//!
//! # Design Decisions
//! - No sockets: both halves live in the same process
//! - One pipe per request; pipes are never reused

pub mod connection;
pub mod key;
pub mod stream;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use key::{ConnectionKey, RequestHead};
pub use stream::AppStream;
