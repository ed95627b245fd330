//! Maps container runtime failures onto a fixed, user-facing taxonomy.
//!
//! Typed transport failures map directly onto their category. Opaque failure
//! text falls back to pattern matching, checked in priority order with the
//! first match winning.

use serde::Serialize;
use std::fmt;
use warp::http::StatusCode;

use crate::error::InventoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ApiVersionMismatch,
    Unavailable,
    Permission,
    Timeout,
    Unknown,
}

impl ErrorCategory {
    /// Matching priority for opaque failure text.
    pub const PRIORITY: [ErrorCategory; 5] = [
        ErrorCategory::ApiVersionMismatch,
        ErrorCategory::Unavailable,
        ErrorCategory::Permission,
        ErrorCategory::Timeout,
        ErrorCategory::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::ApiVersionMismatch => "api_version_mismatch",
            ErrorCategory::Unavailable => "unavailable",
            ErrorCategory::Permission => "permission",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Unknown => "unknown",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::ApiVersionMismatch => "docker_api_version",
            ErrorCategory::Unavailable => "docker_unavailable",
            ErrorCategory::Permission => "docker_permission",
            ErrorCategory::Timeout => "docker_timeout",
            ErrorCategory::Unknown => "docker_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCategory::ApiVersionMismatch => StatusCode::BAD_GATEWAY,
            ErrorCategory::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::Permission => StatusCode::FORBIDDEN,
            ErrorCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Lowercased substrings that select this category. `Unknown` has none.
    fn patterns(&self) -> &'static [&'static str] {
        match self {
            ErrorCategory::ApiVersionMismatch => &["api version", "client version"],
            ErrorCategory::Unavailable => &[
                "connection refused",
                "no such host",
                "host unreachable",
                "network is unreachable",
                "cannot connect",
            ],
            ErrorCategory::Permission => &["permission denied", "access denied", "forbidden"],
            ErrorCategory::Timeout => &["timeout", "timed out", "deadline exceeded"],
            ErrorCategory::Unknown => &[],
        }
    }

    fn message(&self, raw: &str) -> String {
        match self {
            ErrorCategory::ApiVersionMismatch => {
                "Docker API version mismatch. Check socket-proxy compatibility.".to_string()
            }
            ErrorCategory::Unavailable => {
                "Cannot connect to Docker. Is the daemon running?".to_string()
            }
            ErrorCategory::Permission => "Permission denied accessing Docker socket.".to_string(),
            ErrorCategory::Timeout => "Docker request timed out.".to_string(),
            ErrorCategory::Unknown => format!("Docker error: {}", raw),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stable (category, code, message) triple
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category}: {message}")]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub code: &'static str,
    pub message: String,
}

impl ClassifiedError {
    fn new(category: ErrorCategory, raw: &str) -> Self {
        Self {
            category,
            code: category.code(),
            message: category.message(raw),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.category.status()
    }
}

/// Categorize opaque failure text.
pub fn category_for_message(raw: &str) -> ErrorCategory {
    let lowered = raw.to_lowercase();
    ErrorCategory::PRIORITY
        .into_iter()
        .find(|category| {
            category
                .patterns()
                .iter()
                .any(|pattern| lowered.contains(pattern))
        })
        .unwrap_or(ErrorCategory::Unknown)
}

pub fn classify_message(raw: &str) -> ClassifiedError {
    ClassifiedError::new(category_for_message(raw), raw)
}

pub fn classify(err: &InventoryError) -> ClassifiedError {
    match err {
        InventoryError::VersionNegotiation { message } => {
            ClassifiedError::new(ErrorCategory::ApiVersionMismatch, message)
        }
        InventoryError::Connectivity { message } => {
            ClassifiedError::new(ErrorCategory::Unavailable, message)
        }
        InventoryError::Permission { message } => {
            ClassifiedError::new(ErrorCategory::Permission, message)
        }
        InventoryError::Timeout { message } => {
            ClassifiedError::new(ErrorCategory::Timeout, message)
        }
        InventoryError::Other { message } => classify_message(message),
    }
}
