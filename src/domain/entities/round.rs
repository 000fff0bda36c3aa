//! Round entity: the live instance of one question.

use std::collections::HashMap;

use tokio::time::Instant;

use super::Question;
use crate::domain::value_objects::ConnectionId;
use crate::shared::error::SessionError;

/// One participant's answer. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub option_index: usize,
    /// Computed against the round's question at submission time
    pub correct: bool,
}

/// Whole seconds left until `deadline`, rounded up. Zero once passed.
pub fn seconds_until(deadline: Instant, now: Instant) -> u64 {
    let left = deadline.saturating_duration_since(now);
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}

/// A question being played.
///
/// Accepts at most one answer per participant. Once deactivated it keeps its
/// question and answers so the resolution can still be shown.
#[derive(Debug, Clone)]
pub struct Round {
    id: u64,
    question_index: usize,
    question: Question,
    active: bool,
    deadline: Instant,
    answers: HashMap<ConnectionId, Answer>,
}

impl Round {
    pub fn new(id: u64, question_index: usize, question: Question, started_at: Instant) -> Self {
        let deadline = started_at + question.time_limit();
        Self {
            id,
            question_index,
            question,
            active: true,
            deadline,
            answers: HashMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn seconds_remaining(&self, now: Instant) -> u64 {
        if self.active {
            seconds_until(self.deadline, now)
        } else {
            0
        }
    }

    pub fn answers(&self) -> &HashMap<ConnectionId, Answer> {
        &self.answers
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// Record an answer for `participant`.
    pub fn record(
        &mut self,
        participant: ConnectionId,
        option_index: usize,
    ) -> Result<Answer, SessionError> {
        if !self.active {
            return Err(SessionError::NoActiveRound);
        }
        if self.answers.contains_key(&participant) {
            return Err(SessionError::AlreadyAnswered);
        }
        if option_index >= self.question.option_count() {
            return Err(SessionError::InvalidOption {
                index: option_index,
                count: self.question.option_count(),
            });
        }

        let answer = Answer {
            option_index,
            correct: self.question.is_correct(option_index),
        };
        self.answers.insert(participant, answer);
        Ok(answer)
    }

    /// Drop the answer of a participant that left mid-round.
    pub fn discard_answer(&mut self, participant: &ConnectionId) {
        if self.active {
            self.answers.remove(participant);
        }
    }

    /// Deactivate the round. Returns `false` if it was already inactive.
    pub fn deactivate(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn question() -> Question {
        Question {
            text: "Capital of France?".into(),
            options: vec!["Lyon".into(), "Paris".into(), "Nice".into()],
            correct_index: 1,
            time_limit_seconds: 10,
        }
    }

    #[test]
    fn test_seconds_until_rounds_up() {
        let now = Instant::now();
        assert_eq!(seconds_until(now + Duration::from_millis(9_100), now), 10);
        assert_eq!(seconds_until(now + Duration::from_secs(3), now), 3);
        assert_eq!(seconds_until(now, now + Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_one_answer_per_participant() {
        let mut round = Round::new(1, 0, question(), Instant::now());
        let alice = ConnectionId::new();

        let answer = round.record(alice, 1).unwrap();
        assert!(answer.correct);
        assert_eq!(round.record(alice, 0), Err(SessionError::AlreadyAnswered));
        assert_eq!(round.answer_count(), 1);
    }

    #[test]
    fn test_repeat_answer_reported_before_option_range() {
        let mut round = Round::new(1, 0, question(), Instant::now());
        let alice = ConnectionId::new();
        round.record(alice, 0).unwrap();

        assert_eq!(round.record(alice, 7), Err(SessionError::AlreadyAnswered));
        assert_eq!(round.answers()[&alice].option_index, 0);
    }

    #[test]
    fn test_out_of_range_option_rejected() {
        let mut round = Round::new(1, 0, question(), Instant::now());
        assert_eq!(
            round.record(ConnectionId::new(), 3),
            Err(SessionError::InvalidOption { index: 3, count: 3 })
        );
        assert_eq!(round.answer_count(), 0);
    }

    #[test]
    fn test_inactive_round_rejects_answers() {
        let mut round = Round::new(1, 0, question(), Instant::now());
        assert!(round.deactivate());
        assert!(!round.deactivate());
        assert_eq!(
            round.record(ConnectionId::new(), 1),
            Err(SessionError::NoActiveRound)
        );
        assert_eq!(round.seconds_remaining(Instant::now()), 0);
    }
}
