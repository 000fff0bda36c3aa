//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **SessionCode**: Short, human-typable code identifying a live session
//! - **ConnectionId**: Identity of one gateway connection (moderator or participant)

mod connection_id;
mod session_code;

pub use connection_id::*;
pub use session_code::*;
