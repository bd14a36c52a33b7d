//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the connector.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the connector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConnectorConfig {
    /// How requests are handed to the application.
    pub transport: TransportConfig,

    /// Timeout configuration (accepted, never enforced).
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Prefix prepended to every application-facing path (e.g., "/api").
    pub root_path: String,

    /// Propagate unhandled application errors to the caller.
    pub raise_app_exceptions: bool,

    /// Capacity of each in-memory pipe, in bytes per direction.
    pub pipe_buffer_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            raise_app_exceptions: true,
            pipe_buffer_bytes: 64 * 1024,
        }
    }
}

/// Client timeout configuration.
///
/// Every field is optional; there is no real connection to time out, so the
/// values are carried through to trace hooks and logs only.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for request/response in seconds.
    pub total_secs: Option<u64>,

    /// Connection establishment timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Socket read timeout in seconds.
    pub read_secs: Option<u64>,
}

/// Timeout settings handed to the connector for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientTimeout {
    pub total: Option<Duration>,
    pub connect: Option<Duration>,
    pub read: Option<Duration>,
}

impl From<&TimeoutConfig> for ClientTimeout {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            total: config.total_secs.map(Duration::from_secs),
            connect: config.connect_secs.map(Duration::from_secs),
            read: config.read_secs.map(Duration::from_secs),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_connector_contract() {
        let config = ConnectorConfig::default();
        assert_eq!(config.transport.root_path, "");
        assert!(config.transport.raise_app_exceptions);
        assert_eq!(ClientTimeout::from(&config.timeouts), ClientTimeout::default());
    }

    #[test]
    fn timeout_seconds_convert_to_durations() {
        let timeouts = TimeoutConfig {
            total_secs: Some(30),
            connect_secs: None,
            read_secs: Some(5),
        };
        let timeout = ClientTimeout::from(&timeouts);
        assert_eq!(timeout.total, Some(Duration::from_secs(30)));
        assert_eq!(timeout.connect, None);
        assert_eq!(timeout.read, Some(Duration::from_secs(5)));
    }
}
