use thiserror::Error;

use crate::classify::ClassifiedError;

/// Portscout error types
#[derive(Error, Debug)]
pub enum PortscoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {reason}")]
    Server { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found at path: {path}")]
    FileNotFound { path: String },

    #[error("Invalid config format: {reason}")]
    InvalidFormat { reason: String },

    #[error("Invalid Docker host '{host}': {reason}")]
    InvalidDockerHost { host: String, reason: String },

    #[error("Invalid listen address: {address}")]
    InvalidListenAddress { address: String },
}

/// Failures produced at the container runtime transport boundary.
///
/// The variant is decided where the failure happens (connect error, HTTP
/// status, timer), so downstream classification never has to guess from text
/// unless the failure is genuinely opaque.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("cannot reach container runtime: {message}")]
    Connectivity { message: String },

    #[error("API version negotiation failed: {message}")]
    VersionNegotiation { message: String },

    #[error("access to container runtime denied: {message}")]
    Permission { message: String },

    #[error("container runtime request timed out: {message}")]
    Timeout { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl InventoryError {
    pub fn other(message: impl Into<String>) -> Self {
        InventoryError::Other {
            message: message.into(),
        }
    }
}

/// Outcome of a failed query: either the caller's input or the runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{0}")]
    Upstream(ClassifiedError),
}

impl QueryError {
    pub fn missing_param(name: &str) -> Self {
        QueryError::Validation {
            code: "missing_param",
            message: format!("Missing {} parameter", name),
        }
    }

    pub fn invalid_param(name: &str) -> Self {
        QueryError::Validation {
            code: "invalid_param",
            message: format!("Invalid {} parameter", name),
        }
    }
}

/// Convenience type alias for Portscout results
pub type Result<T, E = PortscoutError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            QueryError::missing_param("port").to_string(),
            "Missing port parameter"
        );
        assert_eq!(
            QueryError::invalid_param("port").to_string(),
            "Invalid port parameter"
        );
    }

    #[test]
    fn test_config_error_wraps_into_top_level() {
        let err: PortscoutError = ConfigError::InvalidListenAddress {
            address: "nope:99999".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("nope:99999"));
    }

    #[test]
    fn test_errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PortscoutError>();
        assert_send_sync::<InventoryError>();
        assert_send_sync::<QueryError>();
    }
}
