//! WebSocket Gateway
//!
//! Tracks open connections and routes outbound frames to them. The gateway
//! is the [`EventSink`] every session worker publishes through.

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::messages::GatewaySend;
use crate::application::events::{EventSink, SessionEvent};
use crate::domain::value_objects::ConnectionId;
use crate::infrastructure::metrics;

/// Item queued for a connection's writer task.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Session event; the writer stamps the sequence number
    Event(SessionEvent),
    /// Pre-built frame (hello, replies)
    Frame(GatewaySend),
}

/// Open connections, keyed by connection id.
#[derive(Default)]
pub struct Gateway {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Outbound>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection
    pub fn register(&self, connection_id: ConnectionId, sender: mpsc::UnboundedSender<Outbound>) {
        self.connections.insert(connection_id, sender);
        metrics::set_websocket_connections(self.connections.len());
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection
    pub fn unregister(&self, connection_id: &ConnectionId) {
        if self.connections.remove(connection_id).is_some() {
            metrics::set_websocket_connections(self.connections.len());
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Queue an item for one connection. Returns `false` if it is gone.
    pub fn send(&self, connection_id: &ConnectionId, item: Outbound) -> bool {
        match self.connections.get(connection_id) {
            Some(sender) => sender.send(item).is_ok(),
            None => false,
        }
    }

    /// Get connection count
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl EventSink for Gateway {
    fn deliver(&self, connection: &ConnectionId, event: &SessionEvent) {
        if !self.send(connection, Outbound::Event(event.clone())) {
            tracing::trace!(
                connection_id = %connection,
                event = event.event_name(),
                "Dropped event for closed connection"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::RoundTickEvent;

    #[test]
    fn test_register_and_deliver() {
        let gateway = Gateway::new();
        let connection = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        gateway.register(connection, tx);
        assert_eq!(gateway.connection_count(), 1);

        let event = SessionEvent::RoundTick(RoundTickEvent { seconds_remaining: 1 });
        gateway.broadcast(&[connection, ConnectionId::new()], &event);

        match rx.try_recv() {
            Ok(Outbound::Event(received)) => assert_eq!(received, event),
            other => panic!("unexpected outbound item: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unregister_drops_delivery() {
        let gateway = Gateway::new();
        let connection = ConnectionId::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        gateway.register(connection, tx);
        gateway.unregister(&connection);

        assert_eq!(gateway.connection_count(), 0);
        assert!(!gateway.send(&connection, Outbound::Event(SessionEvent::SessionClosed)));
    }
}
