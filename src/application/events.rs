//! Outbound session events.
//!
//! Every notification a session sends to its members is one variant of
//! [`SessionEvent`] with a fixed payload schema. Delivery is delegated to an
//! [`EventSink`], implemented by the WebSocket gateway.

use serde::Serialize;

use crate::domain::entities::{QuestionView, RosterView};
use crate::domain::services::ScoreboardEntry;
use crate::domain::value_objects::{ConnectionId, SessionCode};

/// Session event types delivered to members.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t", content = "d")]
pub enum SessionEvent {
    #[serde(rename = "session-created")]
    SessionCreated(SessionCreatedEvent),
    #[serde(rename = "roster-updated")]
    RosterUpdated(RosterView),
    #[serde(rename = "round-started")]
    RoundStarted(QuestionView),
    #[serde(rename = "round-tick")]
    RoundTick(RoundTickEvent),
    #[serde(rename = "round-ended")]
    RoundEnded(RoundEndedEvent),
    #[serde(rename = "game-finished")]
    GameFinished(GameFinishedEvent),
    #[serde(rename = "session-closed")]
    SessionClosed,
}

impl SessionEvent {
    /// Get the event name for dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::SessionCreated(_) => "session-created",
            SessionEvent::RosterUpdated(_) => "roster-updated",
            SessionEvent::RoundStarted(_) => "round-started",
            SessionEvent::RoundTick(_) => "round-tick",
            SessionEvent::RoundEnded(_) => "round-ended",
            SessionEvent::GameFinished(_) => "game-finished",
            SessionEvent::SessionClosed => "session-closed",
        }
    }

    /// Payload as JSON; `None` for events without a payload.
    pub fn payload(&self) -> Option<serde_json::Value> {
        let value = match self {
            SessionEvent::SessionCreated(e) => serde_json::to_value(e),
            SessionEvent::RosterUpdated(e) => serde_json::to_value(e),
            SessionEvent::RoundStarted(e) => serde_json::to_value(e),
            SessionEvent::RoundTick(e) => serde_json::to_value(e),
            SessionEvent::RoundEnded(e) => serde_json::to_value(e),
            SessionEvent::GameFinished(e) => serde_json::to_value(e),
            SessionEvent::SessionClosed => return None,
        };

        match value {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::error!(event = self.event_name(), error = %e, "Failed to serialize event");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionCreatedEvent {
    pub code: SessionCode,
    pub moderator: String,
    pub role: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTickEvent {
    pub seconds_remaining: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEndedEvent {
    pub scoreboard: Vec<ScoreboardEntry>,
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameFinishedEvent {
    pub scoreboard: Vec<ScoreboardEntry>,
}

/// Delivers session events to connections.
///
/// Delivery is fire-and-forget: a connection that has gone away simply
/// misses the event.
pub trait EventSink: Send + Sync + 'static {
    /// Deliver an event to one connection.
    fn deliver(&self, connection: &ConnectionId, event: &SessionEvent);

    /// Deliver an event to each of `connections`.
    fn broadcast(&self, connections: &[ConnectionId], event: &SessionEvent) {
        for connection in connections {
            self.deliver(connection, event);
        }
    }
}
