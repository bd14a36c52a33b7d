//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ConnectorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ConnectorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ConnectorConfig, ConfigError> {
    let config: ConnectorConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config_with_defaults() {
        let config = parse_config(
            r#"
            [transport]
            root_path = "/api"
            raise_app_exceptions = false

            [timeouts]
            total_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.transport.root_path, "/api");
        assert!(!config.transport.raise_app_exceptions);
        assert_eq!(config.transport.pipe_buffer_bytes, 64 * 1024);
        assert_eq!(config.timeouts.total_secs, Some(30));
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn empty_document_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.transport.root_path, "");
        assert!(config.transport.raise_app_exceptions);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = parse_config("[transport]\nroot_path = \"api\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: transport.root_path"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_config("[transport\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/app-connector.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
