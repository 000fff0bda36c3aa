//! # Domain Services
//!
//! Domain services encapsulate business logic that doesn't naturally belong
//! to a single entity.
//!
//! ## Services
//!
//! - **ScoreboardBuilder**: Ranked, tie-aware leaderboard from participant scores

mod scoreboard;

pub use scoreboard::*;
