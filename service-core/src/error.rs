use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {message}: {source}")]
    BadRequest {
        message: String,
        source: anyhow::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {message}: {source}")]
    DatabaseError {
        message: String,
        source: anyhow::Error,
    },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Service Unavailable")]
    ServiceUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn database(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::DatabaseError {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::database("Database error", err)
    }
}

/// Body written for every error response. Callers tell cases apart by
/// status code and `message`; `error` carries the underlying detail.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            AppError::BadRequest { message, source } => {
                (StatusCode::BAD_REQUEST, message, Some(source.to_string()))
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            AppError::DatabaseError { message, source } => {
                tracing::error!(error = %source, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message,
                    Some(source.to_string()),
                )
            }
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(format!("{:#}", err)),
                )
            }
            AppError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable".to_string(),
                None,
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
        };

        (status, Json(ErrorResponse { message, error })).into_response()
    }
}
