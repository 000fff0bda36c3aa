//! Application Services
//!
//! - **SessionRegistry**: code to live session map; create, lookup, destroy
//! - **SessionHandle**: address of the task that owns one session
//! - **RoundTimer**: per-round deadline and countdown ticks

pub mod round_timer;
pub mod session_registry;
pub mod session_worker;

pub use round_timer::{schedule_once, RoundTimer, TimerHandle};
pub use session_registry::SessionRegistry;
pub use session_worker::{ResolveTrigger, SessionHandle};
