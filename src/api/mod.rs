//! HTTP/JSON query surface.

pub mod server;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};

use crate::error::QueryError;

pub use server::{ApiServer, routes};

/// Body of every failure response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub code: String,
}

impl ErrorBody {
    pub fn new(error: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            code: code.to_string(),
        }
    }
}

pub fn json_response<T: Serialize>(body: &T, status: StatusCode) -> Response {
    reply::with_status(reply::json(body), status).into_response()
}

impl From<&QueryError> for ErrorBody {
    fn from(err: &QueryError) -> Self {
        match err {
            QueryError::Validation { code, message } => {
                ErrorBody::new("validation", code, message.clone())
            }
            QueryError::Upstream(classified) => ErrorBody::new(
                classified.category.label(),
                classified.code,
                classified.message.clone(),
            ),
        }
    }
}

pub fn error_status(err: &QueryError) -> StatusCode {
    match err {
        QueryError::Validation { .. } => StatusCode::BAD_REQUEST,
        QueryError::Upstream(classified) => classified.status(),
    }
}

pub fn error_response(err: &QueryError) -> Response {
    json_response(&ErrorBody::from(err), error_status(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_message;

    #[test]
    fn test_error_response_status() {
        let response = error_response(&QueryError::missing_param("port"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&QueryError::Upstream(classify_message(
            "request timed out",
        )));
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_error_body_fields() {
        let body = ErrorBody::from(&QueryError::invalid_param("port"));
        assert_eq!(body, ErrorBody::new("validation", "invalid_param", "Invalid port parameter"));

        let body = ErrorBody::from(&QueryError::Upstream(classify_message(
            "dial tcp: connection refused",
        )));
        assert_eq!(body.error, "unavailable");
        assert_eq!(body.code, "docker_unavailable");
        assert_eq!(body.message, "Cannot connect to Docker. Is the daemon running?");
    }
}
