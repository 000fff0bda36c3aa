//! Session Worker
//!
//! Every live session is owned by exactly one tokio task. Requests from the
//! gateway and callbacks from the round timers reach it as messages on an
//! unbounded mailbox, so a deadline, an answer and a moderator override that
//! arrive at the same instant are applied one after another.
//!
//! Timer messages carry the id of the round they were scheduled for and are
//! dropped when that round is no longer the current one.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::round_timer::{schedule_once, RoundTimer, TimerHandle};
use crate::application::events::{
    EventSink, GameFinishedEvent, RoundEndedEvent, RoundTickEvent, SessionEvent,
};
use crate::config::GameSettings;
use crate::domain::entities::{AnswerReceipt, Departure, Question, Session, SessionSummary};
use crate::domain::value_objects::{ConnectionId, SessionCode};
use crate::infrastructure::metrics;
use crate::shared::error::SessionError;

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum SessionMessage {
    Join {
        connection: ConnectionId,
        nickname: String,
        reply: Reply<String>,
    },
    SubmitQuestions {
        connection: ConnectionId,
        questions: Vec<Question>,
        reply: Reply<usize>,
    },
    StartGame {
        connection: ConnectionId,
        reply: Reply<()>,
    },
    SubmitAnswer {
        connection: ConnectionId,
        option_index: usize,
        reply: Reply<AnswerReceipt>,
    },
    EndRound {
        connection: ConnectionId,
        reply: Reply<()>,
    },
    Leave {
        connection: ConnectionId,
        reply: Reply<Departure>,
    },
    Close {
        reply: Reply<()>,
    },
    Summary {
        reply: Reply<SessionSummary>,
    },
    Tick {
        round_id: u64,
        seconds_remaining: u64,
    },
    Deadline {
        round_id: u64,
    },
    Advance {
        round_id: u64,
    },
}

/// What ended a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTrigger {
    Deadline,
    AllAnswered,
    Moderator,
}

impl ResolveTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveTrigger::Deadline => "deadline",
            ResolveTrigger::AllAnswered => "all_answered",
            ResolveTrigger::Moderator => "moderator",
        }
    }
}

/// Cloneable address of a session worker.
///
/// Every call fails with `SessionNotFound` once the worker has stopped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    code: SessionCode,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl SessionHandle {
    /// Spawn the worker task that owns `session`.
    pub fn spawn(session: Session, sink: Arc<dyn EventSink>, settings: &GameSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let code = session.code().clone();

        let worker = SessionWorker {
            session,
            sink,
            mailbox: tx.downgrade(),
            round_timer: None,
            pause: None,
            between_rounds: settings.between_rounds(),
            tick_interval: settings.tick_interval(),
        };
        tokio::spawn(worker.run(rx));

        Self { code, tx }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    /// The worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub async fn join(&self, connection: ConnectionId, nickname: String) -> Result<String, SessionError> {
        self.request(|reply| SessionMessage::Join {
            connection,
            nickname,
            reply,
        })
        .await
    }

    pub async fn submit_questions(
        &self,
        connection: ConnectionId,
        questions: Vec<Question>,
    ) -> Result<usize, SessionError> {
        self.request(|reply| SessionMessage::SubmitQuestions {
            connection,
            questions,
            reply,
        })
        .await
    }

    pub async fn start_game(&self, connection: ConnectionId) -> Result<(), SessionError> {
        self.request(|reply| SessionMessage::StartGame { connection, reply })
            .await
    }

    pub async fn submit_answer(
        &self,
        connection: ConnectionId,
        option_index: usize,
    ) -> Result<AnswerReceipt, SessionError> {
        self.request(|reply| SessionMessage::SubmitAnswer {
            connection,
            option_index,
            reply,
        })
        .await
    }

    pub async fn end_round(&self, connection: ConnectionId) -> Result<(), SessionError> {
        self.request(|reply| SessionMessage::EndRound { connection, reply })
            .await
    }

    /// Remove a member. When the moderator leaves, the session is closed
    /// and the worker stops before this returns.
    pub async fn leave(&self, connection: ConnectionId) -> Result<Departure, SessionError> {
        self.request(|reply| SessionMessage::Leave { connection, reply })
            .await
    }

    /// Cancel timers, notify every member and stop the worker.
    pub async fn close(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionMessage::Close { reply }).await
    }

    pub async fn summary(&self) -> Result<SessionSummary, SessionError> {
        self.request(|reply| SessionMessage::Summary { reply }).await
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(Reply<T>) -> SessionMessage,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(message(reply))
            .map_err(|_| SessionError::SessionNotFound)?;
        response.await.map_err(|_| SessionError::SessionNotFound)?
    }
}

/// Post a timer message to a worker that may already be gone.
fn post(mailbox: &mpsc::WeakUnboundedSender<SessionMessage>, message: SessionMessage) -> bool {
    match mailbox.upgrade() {
        Some(tx) => tx.send(message).is_ok(),
        None => false,
    }
}

struct SessionWorker {
    session: Session,
    sink: Arc<dyn EventSink>,
    mailbox: mpsc::WeakUnboundedSender<SessionMessage>,
    round_timer: Option<RoundTimer>,
    pause: Option<TimerHandle>,
    between_rounds: Duration,
    tick_interval: Duration,
}

impl SessionWorker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionMessage>) {
        tracing::debug!(code = %self.session.code(), "Session worker started");

        while let Some(message) = rx.recv().await {
            if self.handle(message).is_break() {
                break;
            }
        }

        self.stop_timers();
        tracing::debug!(code = %self.session.code(), "Session worker stopped");
    }

    fn handle(&mut self, message: SessionMessage) -> ControlFlow<()> {
        match message {
            SessionMessage::Join {
                connection,
                nickname,
                reply,
            } => {
                let result = self
                    .session
                    .join(connection, &nickname)
                    .map(|participant| participant.nickname.clone());

                if let Ok(nickname) = &result {
                    tracing::info!(
                        code = %self.session.code(),
                        connection_id = %connection,
                        nickname = %nickname,
                        "Participant joined"
                    );
                }
                let joined = result.is_ok();
                let _ = reply.send(result);
                if joined {
                    self.broadcast_roster();
                }
            }

            SessionMessage::SubmitQuestions {
                connection,
                questions,
                reply,
            } => {
                let result = self.session.replace_questions(&connection, questions);
                if let Ok(total) = result {
                    tracing::info!(code = %self.session.code(), total, "Question set replaced");
                }
                let _ = reply.send(result);
            }

            SessionMessage::StartGame { connection, reply } => {
                let result = self.session.start_game(&connection);
                let started = result.is_ok();
                let _ = reply.send(result);
                if started {
                    tracing::info!(code = %self.session.code(), "Game started");
                    self.launch_next_round();
                }
            }

            SessionMessage::SubmitAnswer {
                connection,
                option_index,
                reply,
            } => {
                let result = self.session.submit_answer(&connection, option_index);
                let complete = match &result {
                    Ok(receipt) => {
                        metrics::record_answer(receipt.correct);
                        receipt.round_complete
                    }
                    Err(_) => false,
                };
                let _ = reply.send(result);
                if complete {
                    let _ = self.resolve_round(ResolveTrigger::AllAnswered);
                }
            }

            SessionMessage::EndRound { connection, reply } => {
                let result = self
                    .session
                    .authorize_moderator(&connection)
                    .and_then(|()| self.resolve_round(ResolveTrigger::Moderator));
                let _ = reply.send(result);
            }

            SessionMessage::Leave { connection, reply } => {
                let departure = self.session.leave(&connection);

                if departure == Departure::Moderator {
                    tracing::info!(code = %self.session.code(), "Moderator left, closing session");
                    self.close_session();
                    let _ = reply.send(Ok(departure));
                    return ControlFlow::Break(());
                }

                let round_complete = match &departure {
                    Departure::Participant {
                        nickname,
                        round_complete,
                    } => {
                        tracing::info!(
                            code = %self.session.code(),
                            connection_id = %connection,
                            nickname = %nickname,
                            "Participant left"
                        );
                        Some(*round_complete)
                    }
                    _ => None,
                };

                let _ = reply.send(Ok(departure));
                if let Some(round_complete) = round_complete {
                    self.broadcast_roster();
                    if round_complete {
                        let _ = self.resolve_round(ResolveTrigger::AllAnswered);
                    }
                }
            }

            SessionMessage::Close { reply } => {
                tracing::info!(code = %self.session.code(), "Session destroyed");
                self.close_session();
                let _ = reply.send(Ok(()));
                return ControlFlow::Break(());
            }

            SessionMessage::Summary { reply } => {
                let _ = reply.send(Ok(self.session.summary(Instant::now())));
            }

            SessionMessage::Tick {
                round_id,
                seconds_remaining,
            } => {
                if self.session.active_round_id() == Some(round_id) {
                    self.broadcast(SessionEvent::RoundTick(RoundTickEvent { seconds_remaining }));
                }
            }

            SessionMessage::Deadline { round_id } => {
                if self.session.active_round_id() == Some(round_id) {
                    let _ = self.resolve_round(ResolveTrigger::Deadline);
                } else {
                    tracing::debug!(code = %self.session.code(), round = round_id, "Stale deadline ignored");
                }
            }

            SessionMessage::Advance { round_id } => {
                if self.session.resolved_round_id() == Some(round_id) {
                    self.launch_next_round();
                }
            }
        }

        ControlFlow::Continue(())
    }

    /// Launch the next question, or finish the game when none is left.
    fn launch_next_round(&mut self) {
        self.stop_timers();

        match self.session.launch_next_round(Instant::now()) {
            Some(launch) => {
                tracing::info!(
                    code = %self.session.code(),
                    round = launch.round_id,
                    question = launch.question.index,
                    total = launch.question.total,
                    time_limit = launch.time_limit_seconds,
                    "Round started"
                );
                self.broadcast(SessionEvent::RoundStarted(launch.question));
                self.round_timer = Some(self.start_round_timer(launch.round_id, launch.deadline));
            }
            None => {
                tracing::info!(code = %self.session.code(), "Game finished");
                let scoreboard = self.session.scoreboard();
                self.broadcast(SessionEvent::GameFinished(GameFinishedEvent { scoreboard }));
            }
        }
    }

    fn start_round_timer(&self, round_id: u64, deadline: Instant) -> RoundTimer {
        let tick_mailbox = self.mailbox.clone();
        let expiry_mailbox = self.mailbox.clone();

        RoundTimer::start(
            deadline,
            self.tick_interval,
            move |seconds_remaining| {
                post(
                    &tick_mailbox,
                    SessionMessage::Tick {
                        round_id,
                        seconds_remaining,
                    },
                )
            },
            move || {
                post(&expiry_mailbox, SessionMessage::Deadline { round_id });
            },
        )
    }

    /// Resolve the active round, publish the result and schedule the next
    /// launch after the pause.
    fn resolve_round(&mut self, trigger: ResolveTrigger) -> Result<(), SessionError> {
        let resolution = self.session.resolve_round()?;
        if let Some(timer) = self.round_timer.take() {
            timer.cancel();
        }

        metrics::record_round_resolved(trigger.as_str());
        tracing::info!(
            code = %self.session.code(),
            round = resolution.round_id,
            trigger = trigger.as_str(),
            has_next = resolution.has_next,
            "Round ended"
        );

        self.broadcast(SessionEvent::RoundEnded(RoundEndedEvent {
            scoreboard: resolution.scoreboard,
            correct_index: resolution.correct_index,
        }));

        let mailbox = self.mailbox.clone();
        let round_id = resolution.round_id;
        self.pause = Some(schedule_once(self.between_rounds, move || {
            post(&mailbox, SessionMessage::Advance { round_id });
        }));
        Ok(())
    }

    /// Stop timers, evict everyone and tell them the session is gone.
    fn close_session(&mut self) {
        self.stop_timers();
        let mut notified = vec![self.session.moderator().connection];
        notified.extend(self.session.close());
        self.sink.broadcast(&notified, &SessionEvent::SessionClosed);
    }

    fn stop_timers(&mut self) {
        if let Some(timer) = self.round_timer.take() {
            timer.cancel();
        }
        if let Some(pause) = self.pause.take() {
            pause.cancel();
        }
    }

    fn broadcast_roster(&self) {
        let roster = self.session.roster(Instant::now());
        self.broadcast(SessionEvent::RosterUpdated(roster));
    }

    fn broadcast(&self, event: SessionEvent) {
        self.sink.broadcast(&self.session.members(), &event);
    }
}
