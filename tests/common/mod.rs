//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, Router};
use axum_test::TestServer;
use parking_lot::Mutex;
use tower::ServiceExt;

use quiz_server::application::events::{EventSink, SessionEvent};
use quiz_server::application::services::SessionRegistry;
use quiz_server::config::{
    CorsSettings, GameSettings, ServerSettings, Settings, WebSocketSettings,
};
use quiz_server::domain::entities::Question;
use quiz_server::domain::services::ScoreboardEntry;
use quiz_server::domain::value_objects::ConnectionId;
use quiz_server::startup::{build_router, AppState};

/// Settings equivalent to the built-in defaults, without touching the environment.
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        cors: CorsSettings {
            allowed_origins: Vec::new(),
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            max_frame_size: 16384,
        },
        game: GameSettings::default(),
        environment: "test".into(),
    }
}

/// Test application builder
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(test_settings());
        let router = build_router(state.clone());
        Self { state, router }
    }

    /// Serve the router through axum-test
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

/// Event sink that records every delivery.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(ConnectionId, SessionEvent)>>,
}

impl RecordingSink {
    pub fn events_for(&self, connection: &ConnectionId) -> Vec<SessionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(to, _)| to == connection)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn names_for(&self, connection: &ConnectionId) -> Vec<&'static str> {
        self.events_for(connection)
            .iter()
            .map(SessionEvent::event_name)
            .collect()
    }

    pub fn count_for(&self, connection: &ConnectionId, name: &str) -> usize {
        self.names_for(connection)
            .into_iter()
            .filter(|n| *n == name)
            .count()
    }

    pub fn total(&self) -> usize {
        self.events.lock().len()
    }
}

impl EventSink for RecordingSink {
    fn deliver(&self, connection: &ConnectionId, event: &SessionEvent) {
        self.events.lock().push((*connection, event.clone()));
    }
}

/// Registry wired to a recording sink with default game settings.
pub fn registry() -> (Arc<SessionRegistry>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let registry = Arc::new(SessionRegistry::new(sink.clone(), GameSettings::default()));
    (registry, sink)
}

pub fn question(text: &str, correct_index: usize, time_limit_seconds: u32) -> Question {
    Question {
        text: text.into(),
        options: vec!["A".into(), "B".into(), "C".into()],
        correct_index,
        time_limit_seconds,
    }
}

/// (nickname, score, rank) rows of a scoreboard
pub fn rows(scoreboard: &[ScoreboardEntry]) -> Vec<(String, u32, u32)> {
    scoreboard
        .iter()
        .map(|e| (e.nickname.clone(), e.score, e.rank))
        .collect()
}

/// Let paused time run forward.
pub async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
