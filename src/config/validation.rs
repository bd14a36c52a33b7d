//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate root path shape and pipe sizing
//! - Validate observability settings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConnectorConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::ConnectorConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &ConnectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let root_path = &config.transport.root_path;
    if !root_path.is_empty() {
        if !root_path.starts_with('/') {
            errors.push(ValidationError {
                field: "transport.root_path",
                message: format!("must start with '/', got {:?}", root_path),
            });
        }
        if root_path.ends_with('/') {
            errors.push(ValidationError {
                field: "transport.root_path",
                message: format!("must not end with '/', got {:?}", root_path),
            });
        }
        if root_path.contains(['?', '#']) {
            errors.push(ValidationError {
                field: "transport.root_path",
                message: "must not contain a query or fragment".to_string(),
            });
        }
    }

    if config.transport.pipe_buffer_bytes == 0 {
        errors.push(ValidationError {
            field: "transport.pipe_buffer_bytes",
            message: "must be greater than zero".to_string(),
        });
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: format!("unknown level {:?}", config.observability.log_level),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ConnectorConfig::default()).is_ok());
    }

    #[test]
    fn root_path_must_be_absolute_without_trailing_slash() {
        let mut config = ConnectorConfig::default();
        config.transport.root_path = "api/".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.field == "transport.root_path"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ConnectorConfig::default();
        config.transport.root_path = "/api?x=1".to_string();
        config.transport.pipe_buffer_bytes = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
