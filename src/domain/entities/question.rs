//! Question entity.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single multiple-choice question.
///
/// Immutable once accepted by a session. Invariants (non-blank text, at
/// least two non-blank options, `correct_index` within `options`, positive
/// time limit) are enforced when the inbound payload is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Prompt shown to participants
    pub text: String,

    /// Ordered option texts
    pub options: Vec<String>,

    /// 0-based index of the correct option
    pub correct_index: usize,

    /// Time allowed to answer, in whole seconds
    pub time_limit_seconds: u32,
}

impl Question {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_index
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_limit_seconds))
    }

    /// Public view of the question as sent to clients (no correct index).
    pub fn view(&self, index: usize, total: usize) -> QuestionView {
        QuestionView {
            text: self.text.clone(),
            options: self.options.clone(),
            index: index + 1,
            total,
            time_limit_seconds: self.time_limit_seconds,
        }
    }
}

/// Client-facing question context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    /// 1-based position in the question set
    pub index: usize,
    pub total: usize,
    pub time_limit_seconds: u32,
}
