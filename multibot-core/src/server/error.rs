use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::MultibotError;

/// JSON error body `{ "error": ... }` with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Answer with the status [`MultibotError::status_code`] picks. Client
    /// errors carry their own text; server errors are logged and hidden
    /// behind `message`.
    pub fn from_error(message: &str, cause: impl Into<MultibotError>) -> Self {
        let cause = cause.into();
        let status = StatusCode::from_u16(cause.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let text = match &cause {
            MultibotError::BotNotFound(_) => "Bot not found".to_string(),
            MultibotError::BotInactive(_) => "Bot is not active".to_string(),
            MultibotError::EmptyMessage => "Message is required".to_string(),
            MultibotError::InvalidBot(detail) | MultibotError::ValidationError(detail) => {
                detail.clone()
            }
            MultibotError::ApiRateLimitExceeded { .. } => {
                cause.log();
                "Too many requests, please try again later".to_string()
            }
            _ => {
                cause.log();
                message.to_string()
            }
        };

        Self::new(status, text)
    }
}

impl From<MultibotError> for ApiError {
    fn from(err: MultibotError) -> Self {
        Self::from_error("Internal server error", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
