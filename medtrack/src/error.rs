use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedtrackError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    /// A read against the record store failed. Distinct from an empty result.
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The course row or its day-1 record could not be written.
    #[error("Course could not be started: {0}")]
    CourseStart(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Drug registry error: {0}")]
    DrugRegistry(String),

    #[error("Notification delivery error: {0}")]
    Notification(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("API authentication error: {0}")]
    ApiAuth(String),
}

impl IntoResponse for MedtrackError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MedtrackError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            MedtrackError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            MedtrackError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            MedtrackError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            MedtrackError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            MedtrackError::StoreUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            MedtrackError::CourseStart(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            MedtrackError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            MedtrackError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            MedtrackError::Xml(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            MedtrackError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            MedtrackError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            MedtrackError::DrugRegistry(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            MedtrackError::Notification(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            MedtrackError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            MedtrackError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            MedtrackError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
            MedtrackError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl MedtrackError {
    /// Reclassifies a failed store read so callers can tell it apart from an
    /// empty result.
    pub fn store_unavailable(self) -> Self {
        match self {
            MedtrackError::Database(e) => MedtrackError::StoreUnavailable(e.to_string()),
            MedtrackError::Io(e) => MedtrackError::StoreUnavailable(e.to_string()),
            MedtrackError::Json(e) => MedtrackError::StoreUnavailable(e.to_string()),
            MedtrackError::Internal(msg) => MedtrackError::StoreUnavailable(msg),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, MedtrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_reclassifies_read_failures() {
        let corrupt = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        assert!(matches!(
            MedtrackError::from(corrupt).store_unavailable(),
            MedtrackError::StoreUnavailable(_)
        ));
        assert!(matches!(
            MedtrackError::Internal("boom".to_string()).store_unavailable(),
            MedtrackError::StoreUnavailable(_)
        ));
        assert!(matches!(
            MedtrackError::NotFound("x".to_string()).store_unavailable(),
            MedtrackError::NotFound(_)
        ));
    }
}
