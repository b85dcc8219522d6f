use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// HTTP boundary error
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} not found", resource.into()),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

// ============================================================================
// Error Codes
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "NOT_FOUND",
        };
        write!(f, "{}", s)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// Error Response for HTTP
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: AppError,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ============================================================================
// Agent execution errors
// ============================================================================

/// Failure of an agent or team `run`. Chat endpoints report these in the
/// response body, never as an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("tool execution failed: {0}")]
    ToolExecution(String),
    #[error("agent timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("unknown team member: {0}")]
    UnknownMember(String),
}

/// Failure inside one of the tool adapters handed to the model.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to spawn process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("process timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log_error(&self);
        let status = self.code.http_status();
        (status, Json(ErrorResponse::new(self))).into_response()
    }
}

pub fn log_error(error: &AppError) {
    if error.code.http_status().is_server_error() {
        log::error!("{}", error);
    } else {
        log::warn!("{}", error);
    }
}
