//! Participant entity.

use serde::Serialize;

/// A non-moderator member of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// Trimmed display nickname, unique within the session (case-insensitive)
    pub nickname: String,

    /// Cumulative score; only changed during round resolution
    pub score: u32,

    /// Join sequence within the session, used for roster ordering
    #[serde(skip)]
    pub join_order: u64,
}

impl Participant {
    pub fn new(nickname: impl Into<String>, join_order: u64) -> Self {
        Self {
            nickname: nickname.into(),
            score: 0,
            join_order,
        }
    }

    /// Case-insensitive nickname comparison.
    pub fn has_nickname(&self, nickname: &str) -> bool {
        self.nickname.to_lowercase() == nickname.to_lowercase()
    }
}
