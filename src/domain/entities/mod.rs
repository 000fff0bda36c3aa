//! # Domain Entities
//!
//! Core domain entities of a live quiz session. Nothing here is persisted:
//! a session and everything it owns lives only as long as its moderator's
//! connection.
//!
//! ## Entities
//!
//! - **Session**: One moderator-run game instance and its lifecycle
//! - **Participant**: A non-moderator member who answers questions
//! - **Question**: Immutable prompt, options, correct option and time limit
//! - **Round**: The live instance of one question being asked and timed
//!
//! A `Session` exclusively owns its participants, questions and current
//! round; no entity is shared between sessions.

mod participant;
mod question;
mod round;
mod session;

pub use participant::Participant;
pub use question::{Question, QuestionView};
pub use round::{seconds_until, Answer, Round};
pub use session::{
    AnswerReceipt, Departure, Moderator, RosterEntry, RosterView, RoundLaunch, RoundResolution,
    Session, SessionPhase, SessionSummary,
};
