//! # Domain Layer
//!
//! The domain layer contains the session state machine of the quiz server.
//! It performs no I/O and owns no tasks; the application layer drives it.
//!
//! ## Structure
//!
//! - **entities**: Session, Round, Participant, Question
//! - **value_objects**: Immutable value types (SessionCode, ConnectionId)
//! - **services**: Scoreboard ranking
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Pure business logic and domain rules
//! - No timers: callers pass the current `Instant` in
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
