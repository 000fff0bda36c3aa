//! Request DTOs
//!
//! Payloads of inbound gateway requests. Shape errors are caught by serde
//! and content errors by `validator`, before anything reaches a session.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::entities::Question;
use crate::shared::error::SessionError;
use crate::shared::validation::question_validation_error;

/// create-session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(alias = "name")]
    pub moderator_name: String,
}

/// join-session
#[derive(Debug, Deserialize)]
pub struct JoinSessionRequest {
    pub code: String,
    pub nickname: String,
}

/// start-game and end-round
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub code: String,
}

/// submit-answer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub code: String,

    #[serde(alias = "answerIndex")]
    pub option_index: usize,
}

/// submit-questions
#[derive(Debug, Deserialize)]
pub struct SubmitQuestionsRequest {
    pub code: String,
    pub questions: Vec<QuestionPayload>,
}

/// One question as submitted by the moderator.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "correct_index_in_range"))]
pub struct QuestionPayload {
    #[validate(custom(function = "not_blank"))]
    pub text: String,

    #[validate(
        length(min = 2, message = "At least two options are required"),
        custom(function = "options_not_blank")
    )]
    pub options: Vec<String>,

    #[serde(alias = "correct")]
    pub correct_index: usize,

    #[serde(alias = "time")]
    #[validate(range(min = 1, message = "Time limit must be at least one second"))]
    pub time_limit_seconds: u32,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Must not be blank".into()));
    }
    Ok(())
}

fn options_not_blank(options: &[String]) -> Result<(), ValidationError> {
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(ValidationError::new("blank_option")
            .with_message("Options must not be blank".into()));
    }
    Ok(())
}

fn correct_index_in_range(question: &QuestionPayload) -> Result<(), ValidationError> {
    if question.correct_index >= question.options.len() {
        return Err(ValidationError::new("correct_index")
            .with_message("Correct index is out of range".into()));
    }
    Ok(())
}

impl SubmitQuestionsRequest {
    /// Validate every question and convert the set into domain questions.
    ///
    /// The first invalid question rejects the whole set.
    pub fn into_questions(self) -> Result<Vec<Question>, SessionError> {
        self.questions
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                payload
                    .validate()
                    .map_err(|e| question_validation_error(i + 1, e))?;
                Ok(Question::from(payload))
            })
            .collect()
    }
}

impl From<QuestionPayload> for Question {
    fn from(payload: QuestionPayload) -> Self {
        Self {
            text: payload.text.trim().to_string(),
            options: payload.options.iter().map(|o| o.trim().to_string()).collect(),
            correct_index: payload.correct_index,
            time_limit_seconds: payload.time_limit_seconds,
        }
    }
}
