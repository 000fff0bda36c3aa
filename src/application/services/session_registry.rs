//! Session Registry
//!
//! Process-wide map of session code to live session worker. Constructed
//! once at startup and shared through `AppState`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::session_worker::SessionHandle;
use crate::application::events::{EventSink, SessionCreatedEvent, SessionEvent};
use crate::config::GameSettings;
use crate::domain::entities::{Departure, Moderator, Session, SessionSummary};
use crate::domain::value_objects::{ConnectionId, SessionCode};
use crate::infrastructure::metrics;
use crate::shared::error::SessionError;

type CodeGenerator = Box<dyn Fn(usize) -> SessionCode + Send + Sync>;

pub struct SessionRegistry {
    sessions: DashMap<SessionCode, SessionHandle>,
    sink: Arc<dyn EventSink>,
    settings: GameSettings,
    generate_code: CodeGenerator,
}

impl SessionRegistry {
    pub fn new(sink: Arc<dyn EventSink>, settings: GameSettings) -> Self {
        Self {
            sessions: DashMap::new(),
            sink,
            settings,
            generate_code: Box::new(SessionCode::generate),
        }
    }

    /// Replace the random code source.
    pub fn with_code_generator<F>(mut self, generate: F) -> Self
    where
        F: Fn(usize) -> SessionCode + Send + Sync + 'static,
    {
        self.generate_code = Box::new(generate);
        self
    }

    /// Create a session owned by `moderator` and announce it to that
    /// connection with `session-created`.
    ///
    /// Colliding codes are regenerated up to `code_max_attempts` times.
    pub fn create_session(
        &self,
        moderator: ConnectionId,
        moderator_name: &str,
    ) -> Result<SessionCode, SessionError> {
        let name = moderator_name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyNickname);
        }

        let attempts = self.settings.code_max_attempts;
        for attempt in 1..=attempts {
            let code = (self.generate_code)(self.settings.code_length);

            let created = match self.sessions.entry(code.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    let session = Session::new(
                        code.clone(),
                        Moderator {
                            connection: moderator,
                            name: name.to_string(),
                        },
                        self.settings.scoreboard_options(),
                    );
                    slot.insert(SessionHandle::spawn(
                        session,
                        Arc::clone(&self.sink),
                        &self.settings,
                    ));
                    true
                }
            };

            if !created {
                tracing::debug!(code = %code, attempt, "Session code collision, regenerating");
                continue;
            }

            metrics::set_sessions_active(self.sessions.len());
            tracing::info!(
                code = %code,
                connection_id = %moderator,
                moderator = %name,
                "Session created"
            );

            self.sink.deliver(
                &moderator,
                &SessionEvent::SessionCreated(SessionCreatedEvent {
                    code: code.clone(),
                    moderator: name.to_string(),
                    role: "moderator",
                }),
            );
            return Ok(code);
        }

        tracing::error!(attempts, "Could not allocate a unique session code");
        Err(SessionError::CodeSpaceExhausted(attempts))
    }

    /// Find a live session by (user-typed) code.
    pub fn lookup(&self, code: &str) -> Result<SessionHandle, SessionError> {
        self.get(&SessionCode::parse(code))
    }

    pub fn contains(&self, code: &SessionCode) -> bool {
        self.sessions.contains_key(code)
    }

    /// Remove a member from its session. The session itself is removed when
    /// its moderator leaves, after its worker has closed it.
    pub async fn leave(
        &self,
        code: &SessionCode,
        connection: ConnectionId,
    ) -> Result<Departure, SessionError> {
        let handle = self.get(code)?;
        let departure = handle.leave(connection).await?;
        if departure == Departure::Moderator {
            self.remove(code);
        }
        Ok(departure)
    }

    /// Close a session and then remove it.
    pub async fn destroy(&self, code: &SessionCode) -> Result<(), SessionError> {
        let handle = self.get(code)?;
        let closed = handle.close().await;
        self.remove(code);
        closed
    }

    pub async fn summary(&self, code: &str) -> Result<SessionSummary, SessionError> {
        self.lookup(code)?.summary().await
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Destroy every live session.
    pub async fn shutdown(&self) {
        let codes: Vec<SessionCode> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        tracing::info!(sessions = codes.len(), "Closing all sessions");

        for code in codes {
            if let Err(e) = self.destroy(&code).await {
                tracing::debug!(code = %code, error = %e, "Session already gone at shutdown");
            }
        }
    }

    fn get(&self, code: &SessionCode) -> Result<SessionHandle, SessionError> {
        self.sessions
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or(SessionError::SessionNotFound)
    }

    fn remove(&self, code: &SessionCode) {
        if self.sessions.remove(code).is_some() {
            metrics::set_sessions_active(self.sessions.len());
            tracing::info!(code = %code, "Session removed");
        }
    }
}
