//! WebSocket Connection State

use std::time::Instant;

use crate::domain::value_objects::{ConnectionId, SessionCode};

/// Per-connection state owned by the reader loop.
#[derive(Debug)]
pub struct ConnectionState {
    pub connection_id: ConnectionId,
    pub connected_at: Instant,
    membership: Option<SessionCode>,
}

impl ConnectionState {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            connected_at: Instant::now(),
            membership: None,
        }
    }

    /// Session this connection created or joined, if any.
    pub fn membership(&self) -> Option<&SessionCode> {
        self.membership.as_ref()
    }

    pub fn enter(&mut self, code: SessionCode) {
        self.membership = Some(code);
    }

    pub fn exit(&mut self) -> Option<SessionCode> {
        self.membership.take()
    }
}

/// Sequence numbers stamped on dispatch frames, starting at 1.
#[derive(Debug, Default)]
pub struct Sequence(u64);

impl Sequence {
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}
