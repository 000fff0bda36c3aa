//! Session entity and its state machine.
//!
//! A `Session` is a plain value: it validates and applies every transition
//! synchronously and reports what happened. Scheduling (deadlines, ticks,
//! the pause between rounds) and delivery of events belong to the worker
//! that owns the session.
//!
//! ```text
//! Lobby --start--> RoundActive --resolve--> RoundResolved --advance--> RoundActive ...
//!                                                   |
//!                                                   +--(no questions left)--> GameFinished
//! any state --moderator leaves--> Closed
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::{Participant, Question, QuestionView, Round};
use crate::domain::services::{ScoreboardBuilder, ScoreboardEntry, ScoreboardOptions};
use crate::domain::value_objects::{ConnectionId, SessionCode};
use crate::shared::error::SessionError;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No question launched yet
    Lobby,
    /// A round is live and accepting answers
    RoundActive,
    /// Round ended, scoreboard shown, next round pending
    RoundResolved,
    /// Questions exhausted, final scoreboard shown
    GameFinished,
    /// Moderator gone; terminal
    Closed,
}

/// The session owner.
#[derive(Debug, Clone)]
pub struct Moderator {
    pub connection: ConnectionId,
    pub name: String,
}

/// Roster row as broadcast to members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub nickname: String,
    pub score: u32,
}

/// Everything a (late) joiner needs to resynchronize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub participants: Vec<RosterEntry>,
    pub round_active: bool,
    pub time_remaining: u64,
    pub question: Option<QuestionView>,
}

/// Read-only public view of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub code: SessionCode,
    pub moderator: String,
    pub phase: SessionPhase,
    pub question_count: usize,
    #[serde(flatten)]
    pub roster: RosterView,
    pub created_at: DateTime<Utc>,
}

/// A newly launched round.
#[derive(Debug, Clone)]
pub struct RoundLaunch {
    pub round_id: u64,
    pub question: QuestionView,
    pub time_limit_seconds: u32,
    pub deadline: Instant,
}

/// Outcome of an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerReceipt {
    pub correct: bool,
    /// Every current participant has now answered
    pub round_complete: bool,
}

/// Outcome of resolving a round.
#[derive(Debug, Clone)]
pub struct RoundResolution {
    pub round_id: u64,
    pub correct_index: usize,
    pub scoreboard: Vec<ScoreboardEntry>,
    pub has_next: bool,
}

/// Who left a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The moderator; the session must be closed
    Moderator,
    /// A participant was removed
    Participant {
        nickname: String,
        round_complete: bool,
    },
    /// The connection was not a member
    Unknown,
}

/// One live quiz session.
#[derive(Debug)]
pub struct Session {
    code: SessionCode,
    moderator: Moderator,
    questions: Vec<Question>,
    current_index: usize,
    round: Option<Round>,
    participants: HashMap<ConnectionId, Participant>,
    phase: SessionPhase,
    next_round_id: u64,
    next_join_order: u64,
    scoreboard_options: ScoreboardOptions,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(code: SessionCode, moderator: Moderator, scoreboard_options: ScoreboardOptions) -> Self {
        Self {
            code,
            moderator,
            questions: Vec::new(),
            current_index: 0,
            round: None,
            participants: HashMap::new(),
            phase: SessionPhase::Lobby,
            next_round_id: 1,
            next_join_order: 0,
            scoreboard_options,
            created_at: Utc::now(),
        }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn moderator(&self) -> &Moderator {
        &self.moderator
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_moderator(&self, connection: &ConnectionId) -> bool {
        self.moderator.connection == *connection
    }

    /// Id of the round currently accepting answers.
    pub fn active_round_id(&self) -> Option<u64> {
        self.round.as_ref().filter(|r| r.is_active()).map(Round::id)
    }

    /// Id of the round whose result is on screen, while the next one is pending.
    pub fn resolved_round_id(&self) -> Option<u64> {
        match self.phase {
            SessionPhase::RoundResolved => self.round.as_ref().map(Round::id),
            _ => None,
        }
    }

    /// Everyone who receives session broadcasts: the moderator, then the
    /// participants in join order.
    pub fn members(&self) -> Vec<ConnectionId> {
        let mut members = Vec::with_capacity(self.participants.len() + 1);
        members.push(self.moderator.connection);
        members.extend(self.participants_in_join_order().into_iter().map(|(id, _)| *id));
        members
    }

    pub fn authorize_moderator(&self, connection: &ConnectionId) -> Result<(), SessionError> {
        if self.is_moderator(connection) {
            Ok(())
        } else {
            Err(SessionError::NotModerator)
        }
    }

    /// Add a participant under a trimmed, case-insensitively unique nickname.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        nickname: &str,
    ) -> Result<&Participant, SessionError> {
        if self.phase == SessionPhase::Closed {
            return Err(SessionError::SessionNotFound);
        }
        if self.is_moderator(&connection) || self.participants.contains_key(&connection) {
            return Err(SessionError::AlreadyJoined);
        }

        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(SessionError::EmptyNickname);
        }
        if self.participants.values().any(|p| p.has_nickname(nickname)) {
            return Err(SessionError::NicknameTaken);
        }

        let participant = Participant::new(nickname, self.next_join_order);
        self.next_join_order += 1;
        Ok(self.participants.entry(connection).or_insert(participant))
    }

    /// Replace the whole question set and rewind progression.
    pub fn replace_questions(
        &mut self,
        connection: &ConnectionId,
        questions: Vec<Question>,
    ) -> Result<usize, SessionError> {
        self.authorize_moderator(connection)?;
        match self.phase {
            SessionPhase::RoundActive | SessionPhase::RoundResolved => {
                return Err(SessionError::GameInProgress)
            }
            SessionPhase::Closed => return Err(SessionError::SessionNotFound),
            SessionPhase::Lobby | SessionPhase::GameFinished => {}
        }

        self.questions = questions;
        self.current_index = 0;
        self.round = None;
        self.phase = SessionPhase::Lobby;
        Ok(self.questions.len())
    }

    /// Rewind to the first question and reset scores. The caller launches
    /// the first round with [`Session::launch_next_round`].
    pub fn start_game(&mut self, connection: &ConnectionId) -> Result<(), SessionError> {
        self.authorize_moderator(connection)?;
        match self.phase {
            SessionPhase::Lobby | SessionPhase::GameFinished => {}
            SessionPhase::RoundActive | SessionPhase::RoundResolved => {
                return Err(SessionError::GameInProgress)
            }
            SessionPhase::Closed => return Err(SessionError::SessionNotFound),
        }
        if self.questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        self.current_index = 0;
        self.round = None;
        for participant in self.participants.values_mut() {
            participant.score = 0;
        }
        Ok(())
    }

    /// Launch the question at the current index.
    ///
    /// Returns `None` and moves to `GameFinished` when no question is left.
    pub fn launch_next_round(&mut self, now: Instant) -> Option<RoundLaunch> {
        if self.phase == SessionPhase::Closed {
            return None;
        }

        let Some(question) = self.questions.get(self.current_index).cloned() else {
            self.phase = SessionPhase::GameFinished;
            if let Some(round) = self.round.as_mut() {
                round.deactivate();
            }
            return None;
        };

        let round_id = self.next_round_id;
        self.next_round_id += 1;

        let view = question.view(self.current_index, self.questions.len());
        let time_limit_seconds = question.time_limit_seconds;
        let round = Round::new(round_id, self.current_index, question, now);
        let launch = RoundLaunch {
            round_id,
            question: view,
            time_limit_seconds,
            deadline: round.deadline(),
        };
        self.round = Some(round);
        self.phase = SessionPhase::RoundActive;
        Some(launch)
    }

    /// Record one participant's answer for the active round.
    pub fn submit_answer(
        &mut self,
        connection: &ConnectionId,
        option_index: usize,
    ) -> Result<AnswerReceipt, SessionError> {
        if !self.participants.contains_key(connection) {
            return Err(SessionError::NotAParticipant);
        }
        let round = self.round.as_mut().ok_or(SessionError::NoActiveRound)?;
        let answer = round.record(*connection, option_index)?;

        Ok(AnswerReceipt {
            correct: answer.correct,
            round_complete: self.is_round_complete(),
        })
    }

    /// All current participants (at least one) have answered the active round.
    pub fn is_round_complete(&self) -> bool {
        match self.round.as_ref() {
            Some(round) if round.is_active() && !self.participants.is_empty() => {
                round.answer_count() >= self.participants.len()
            }
            _ => false,
        }
    }

    /// End the active round: deactivate it, credit correct answers, rank
    /// everyone and advance to the next question index.
    ///
    /// Resolving twice yields `NoActiveRound` and changes nothing.
    pub fn resolve_round(&mut self) -> Result<RoundResolution, SessionError> {
        if self.phase != SessionPhase::RoundActive {
            return Err(SessionError::NoActiveRound);
        }
        let round = self.round.as_mut().ok_or(SessionError::NoActiveRound)?;
        if !round.deactivate() {
            return Err(SessionError::NoActiveRound);
        }

        for (connection, answer) in round.answers() {
            if !answer.correct {
                continue;
            }
            if let Some(participant) = self.participants.get_mut(connection) {
                participant.score += 1;
            }
        }

        let round_id = round.id();
        let correct_index = round.question().correct_index;

        self.current_index += 1;
        self.phase = SessionPhase::RoundResolved;

        Ok(RoundResolution {
            round_id,
            correct_index,
            scoreboard: self.scoreboard(),
            has_next: self.current_index < self.questions.len(),
        })
    }

    /// Remove a member. A moderator departure is reported, not applied:
    /// the caller must [`Session::close`] the session.
    pub fn leave(&mut self, connection: &ConnectionId) -> Departure {
        if self.is_moderator(connection) {
            return Departure::Moderator;
        }

        match self.participants.remove(connection) {
            Some(participant) => {
                if let Some(round) = self.round.as_mut() {
                    round.discard_answer(connection);
                }
                Departure::Participant {
                    nickname: participant.nickname,
                    round_complete: self.is_round_complete(),
                }
            }
            None => Departure::Unknown,
        }
    }

    /// Close the session and evict every participant. Returns the evicted
    /// connections in join order.
    pub fn close(&mut self) -> Vec<ConnectionId> {
        self.phase = SessionPhase::Closed;
        if let Some(round) = self.round.as_mut() {
            round.deactivate();
        }

        let evicted: Vec<ConnectionId> = self
            .participants_in_join_order()
            .into_iter()
            .map(|(id, _)| *id)
            .collect();
        self.participants.clear();
        evicted
    }

    /// Ranked leaderboard over all current participants.
    pub fn scoreboard(&self) -> Vec<ScoreboardEntry> {
        ScoreboardBuilder::build(&self.participants, &self.scoreboard_options)
    }

    /// Roster and round context for resynchronizing clients.
    pub fn roster(&self, now: Instant) -> RosterView {
        let participants = self
            .participants_in_join_order()
            .into_iter()
            .map(|(_, p)| RosterEntry {
                nickname: p.nickname.clone(),
                score: p.score,
            })
            .collect();

        let round = self.round.as_ref();
        let question = match self.phase {
            SessionPhase::RoundActive | SessionPhase::RoundResolved => round.map(|r| {
                r.question().view(r.question_index(), self.questions.len())
            }),
            _ => None,
        };

        RosterView {
            participants,
            round_active: round.is_some_and(Round::is_active),
            time_remaining: round.map(|r| r.seconds_remaining(now)).unwrap_or(0),
            question,
        }
    }

    pub fn summary(&self, now: Instant) -> SessionSummary {
        SessionSummary {
            code: self.code.clone(),
            moderator: self.moderator.name.clone(),
            phase: self.phase,
            question_count: self.questions.len(),
            roster: self.roster(now),
            created_at: self.created_at,
        }
    }

    fn participants_in_join_order(&self) -> Vec<(&ConnectionId, &Participant)> {
        let mut list: Vec<_> = self.participants.iter().collect();
        list.sort_by_key(|(_, p)| p.join_order);
        list
    }
}
