//! Error types and handling for Maritaca Core

use thiserror::Error;

/// Result type alias for Maritaca operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Maritaca Core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid server URL '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid server URL {url:?}: contains control characters")]
    ServerUrlControlCharacter { url: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

impl ConfigError {
    /// Whether this error rejected a server URL
    pub fn is_server_url(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidServerUrl { .. } | ConfigError::ServerUrlControlCharacter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_server_url_message_names_url() {
        let source = url::Url::parse("::").unwrap_err();
        let err: Error = ConfigError::InvalidServerUrl {
            url: "::".to_string(),
            source,
        }
        .into();

        let message = err.to_string();
        assert!(message.starts_with("Configuration error: Invalid server URL '::'"));
        let Error::Config(config_err) = err;
        assert!(config_err.is_server_url());
    }

    #[test]
    fn test_control_character_message_escapes_url() {
        let err = ConfigError::ServerUrlControlCharacter {
            url: "http://localhost\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"Invalid server URL "http://localhost\n": contains control characters"#
        );
        assert!(err.is_server_url());

        let other = ConfigError::MissingField {
            field: "model".to_string(),
        };
        assert!(!other.is_server_url());
    }
}
