use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

const INVALID_INPUT_MESSAGE: &str = "Invalid request data";
const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to generate recommendations";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidInput(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": INVALID_INPUT_MESSAGE, "details": details }),
            ),
            AppError::ConfigurationMissing(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            // Upstream details stay in the logs
            AppError::Upstream(_) | AppError::HttpClient(_) => {
                tracing::error!(error = %self, "Error generating recommendations");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": UPSTREAM_FAILURE_MESSAGE }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
