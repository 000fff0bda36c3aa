//! Response DTOs
//!
//! Results returned to the requesting connection. They are merged into the
//! reply frame next to `"ok": true`.

use serde::Serialize;

use crate::domain::value_objects::SessionCode;

/// create-session result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSessionResponse {
    pub code: SessionCode,
    pub moderator: String,
    pub role: &'static str,
}

/// join-session result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinResponse {
    pub code: SessionCode,
    pub nickname: String,
}

/// submit-questions result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitQuestionsResponse {
    pub total: usize,
}

/// submit-answer result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerResponse {
    pub accepted: bool,
    pub correct: bool,
}
