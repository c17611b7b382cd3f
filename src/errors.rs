use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self {
            AppError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, Some("storage-unavailable")),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
        };

        let body = match reason {
            Some(reason) => serde_json::json!({ "error": self.to_string(), "reason": reason }),
            None => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
