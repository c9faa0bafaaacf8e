use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    // Configuration errors
    ConfigError(String),
    ValidationError(String),

    // Storage errors
    RedisError(String),
    PersistenceError(String),
    CacheError(String),

    // Request errors
    BadRequest(String),
    DuplicateJoke(String),

    // Acquisition errors
    GenerationError(String),
    GenerationTimeout(String),
    NoJokeAvailable(String),
    DuplicateRetriesExhausted(u32),

    // Internal errors
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::RedisError(msg) => write!(f, "Redis error: {}", msg),
            Self::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
            Self::CacheError(msg) => write!(f, "Cache error: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::DuplicateJoke(msg) => write!(f, "Duplicate joke: {}", msg),
            Self::GenerationError(msg) => write!(f, "Generation error: {}", msg),
            Self::GenerationTimeout(msg) => write!(f, "Generation timeout: {}", msg),
            Self::NoJokeAvailable(msg) => write!(f, "No joke available: {}", msg),
            Self::DuplicateRetriesExhausted(attempts) => write!(
                f,
                "Every candidate was a near-duplicate after {} attempts",
                attempts
            ),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Storage failures are re-tagged by the gateway that observed them
    pub fn into_persistence(self) -> Self {
        match self {
            Self::RedisError(msg) | Self::InternalError(msg) => Self::PersistenceError(msg),
            other => other,
        }
    }

    pub fn into_cache(self) -> Self {
        match self {
            Self::RedisError(msg) | Self::InternalError(msg) => Self::CacheError(msg),
            other => other,
        }
    }

    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Self::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Self::ValidationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "validation_error"),
            Self::RedisError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "redis_error"),
            Self::PersistenceError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error"),
            Self::CacheError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "cache_error"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::DuplicateJoke(_) => (StatusCode::CONFLICT, "duplicate_joke"),
            Self::GenerationError(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
            Self::GenerationTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "generation_timeout"),
            Self::NoJokeAvailable(_) => (StatusCode::NOT_FOUND, "no_joke_available"),
            Self::DuplicateRetriesExhausted(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "duplicate_retries_exhausted",
            ),
            Self::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

// Conversion implementations for common error types
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        Self::RedisError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::GenerationTimeout(err.to_string());
        }
        Self::GenerationError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Check if the underlying error is a Redis error
        if let Some(redis_err) = err.downcast_ref::<redis::RedisError>() {
            return Self::RedisError(redis_err.to_string());
        }
        Self::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias for application errors
pub type Result<T> = std::result::Result<T, AppError>;
