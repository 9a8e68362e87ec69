use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};

use super::v1::response::{ApiResponse, ErrorCode};

/// JSON body extractor whose rejections use the v1 envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RequestRejection))]
pub struct AppJson<T>(pub T);

/// Query-string extractor whose rejections use the v1 envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RequestRejection))]
pub struct AppQuery<T>(pub T);

pub struct RequestRejection(ApiResponse<()>);

impl IntoResponse for RequestRejection {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl From<JsonRejection> for RequestRejection {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => {
                let message = err.body_text();
                match extract_missing_field(&message) {
                    Some(field) => format!("Missing required field: {field}"),
                    None => format!("Invalid JSON: {message}"),
                }
            }
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err.body_text()),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing `Content-Type: application/json` header".to_string()
            }
            other => other.body_text(),
        };
        Self(ApiResponse::error(ErrorCode::InvalidRequest, message))
    }
}

impl From<QueryRejection> for RequestRejection {
    fn from(rejection: QueryRejection) -> Self {
        Self(ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!("Invalid query: {}", rejection.body_text()),
        ))
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
