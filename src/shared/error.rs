//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! `SessionError` is the error every session operation reports back to the
//! originating caller. `AppError` is its HTTP-facing counterpart.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error classification reported to clients alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Authorization,
    StateConflict,
    Internal,
}

/// Errors produced by session operations.
///
/// All of these are recoverable: they are returned to the caller that issued
/// the request and never terminate the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Nickname must not be empty")]
    EmptyNickname,

    #[error("Nickname is already taken")]
    NicknameTaken,

    #[error("Invalid question set: {0}")]
    InvalidQuestion(String),

    #[error("Option {index} is out of range for a question with {count} options")]
    InvalidOption { index: usize, count: usize },

    #[error("Malformed request: {0}")]
    MalformedPayload(String),

    #[error("Only the moderator can do that")]
    NotModerator,

    #[error("Not a participant of this session")]
    NotAParticipant,

    #[error("Already a member of a session")]
    AlreadyJoined,

    #[error("No questions have been submitted")]
    NoQuestions,

    #[error("A game is already in progress")]
    GameInProgress,

    #[error("No round is active")]
    NoActiveRound,

    #[error("Answer already submitted for this round")]
    AlreadyAnswered,

    #[error("Could not allocate a unique session code after {0} attempts")]
    CodeSpaceExhausted(u32),
}

impl SessionError {
    /// Classify the error for the wire and for HTTP status mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::SessionNotFound => ErrorKind::NotFound,
            SessionError::EmptyNickname
            | SessionError::NicknameTaken
            | SessionError::InvalidQuestion(_)
            | SessionError::InvalidOption { .. }
            | SessionError::MalformedPayload(_) => ErrorKind::Validation,
            SessionError::NotModerator | SessionError::NotAParticipant => {
                ErrorKind::Authorization
            }
            SessionError::AlreadyJoined
            | SessionError::NoQuestions
            | SessionError::GameInProgress
            | SessionError::NoActiveRound
            | SessionError::AlreadyAnswered => ErrorKind::StateConflict,
            SessionError::CodeSpaceExhausted(_) => ErrorKind::Internal,
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::Validation => AppError::Validation(message),
            ErrorKind::Authorization => AppError::Forbidden(message),
            ErrorKind::StateConflict => AppError::Conflict(message),
            ErrorKind::Internal => AppError::Internal(message),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, 10004, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 10005, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, 10007, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        (status, Json(ErrorResponse { code, message })).into_response()
    }
}
