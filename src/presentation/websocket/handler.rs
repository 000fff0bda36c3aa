//! WebSocket Connection Handler
//!
//! One task per socket reads client requests, forwards them to the session
//! registry and queues the reply. A separate writer task drains the
//! connection's outbound queue (replies and session events) onto the socket.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

use super::gateway::Outbound;
use super::messages::{ClientRequest, GatewayReceive, GatewaySend, OpCode};
use super::session::{ConnectionState, Sequence};
use crate::application::dto::{
    AnswerResponse, CreateSessionRequest, CreateSessionResponse, JoinResponse,
    JoinSessionRequest, SessionRequest, SubmitAnswerRequest, SubmitQuestionsRequest,
    SubmitQuestionsResponse,
};
use crate::domain::value_objects::ConnectionId;
use crate::shared::error::SessionError;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut connection = ConnectionState::new(ConnectionId::new());
    let connection_id = connection.connection_id;

    tracing::debug!(connection_id = %connection_id, "New WebSocket connection");

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Send Hello message immediately
    let hello = match serde_json::to_string(&GatewaySend::hello(connection_id)) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize Hello");
            return;
        }
    };
    if let Err(e) = sender.send(Message::Text(hello.into())).await {
        tracing::error!(connection_id = %connection_id, error = %e, "Failed to send Hello");
        return;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    state.gateway.register(connection_id, tx.clone());

    // Forward queued frames to the socket, numbering dispatches as they go out
    let writer = tokio::spawn(async move {
        let mut sequence = Sequence::default();
        while let Some(item) = rx.recv().await {
            let frame = match item {
                Outbound::Event(event) => GatewaySend::dispatch(&event, sequence.next()),
                Outbound::Frame(frame) => frame,
            };
            let text = match serde_json::to_string(&frame) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    tracing::info!(connection_id = %connection_id, "Client connected");

    // Main message loop
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Some(reply) = handle_message(&text, &mut connection, &state).await {
                    if tx.send(Outbound::Frame(reply)).is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %connection_id, "Connection closed");
                break;
            }
            Ok(_) => {
                // Pings are answered by axum; binary frames are not part of the protocol
            }
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    disconnect(&state, &mut connection).await;
    writer.abort();

    tracing::info!(
        connection_id = %connection_id,
        connected_for_secs = connection.connected_at.elapsed().as_secs(),
        "Client disconnected"
    );
}

/// Drop the connection from the gateway and leave its session, if any.
pub(crate) async fn disconnect(state: &AppState, connection: &mut ConnectionState) {
    let connection_id = connection.connection_id;
    state.gateway.unregister(&connection_id);

    let Some(code) = connection.exit() else {
        return;
    };
    match state.registry.leave(&code, connection_id).await {
        Ok(departure) => tracing::debug!(
            connection_id = %connection_id,
            code = %code,
            departure = ?departure,
            "Left session on disconnect"
        ),
        Err(e) => tracing::debug!(
            connection_id = %connection_id,
            code = %code,
            error = %e,
            "Session already gone on disconnect"
        ),
    }
}

/// Handle one inbound text frame. Returns the reply to queue, if any.
pub(crate) async fn handle_message(
    text: &str,
    connection: &mut ConnectionState,
    state: &AppState,
) -> Option<GatewaySend> {
    let frame: GatewayReceive = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            let error = SessionError::MalformedPayload(format!("Invalid JSON: {}", e));
            return Some(GatewaySend::reply_err(None, None, &error));
        }
    };

    if frame.op != OpCode::Request as u8 {
        tracing::debug!(
            connection_id = %connection.connection_id,
            op = frame.op,
            "Unknown opcode"
        );
        return None;
    }

    let Some(name) = frame.t else {
        let error = SessionError::MalformedPayload("missing event name".into());
        return Some(GatewaySend::reply_err(None, frame.id, &error));
    };

    let request = match ClientRequest::parse(&name, frame.d) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.connection_id,
                event = %name,
                error = %e,
                "Rejected malformed request"
            );
            return Some(GatewaySend::reply_err(Some(name), frame.id, &e));
        }
    };

    let reply = match request {
        ClientRequest::CreateSession(request) => {
            respond(name, frame.id, create_session(state, connection, request))
        }
        ClientRequest::JoinSession(request) => respond(
            name,
            frame.id,
            join_session(state, connection, request).await,
        ),
        ClientRequest::SubmitQuestions(request) => respond(
            name,
            frame.id,
            submit_questions(state, connection, request).await,
        ),
        ClientRequest::StartGame(request) => {
            respond(name, frame.id, start_game(state, connection, request).await)
        }
        ClientRequest::SubmitAnswer(request) => respond(
            name,
            frame.id,
            submit_answer(state, connection, request).await,
        ),
        ClientRequest::EndRound(request) => {
            respond(name, frame.id, end_round(state, connection, request).await)
        }
    };
    Some(reply)
}

fn respond<T: Serialize>(
    name: String,
    id: Option<serde_json::Value>,
    result: Result<T, SessionError>,
) -> GatewaySend {
    match result {
        Ok(body) => GatewaySend::reply_ok(Some(name), id, &body),
        Err(e) => {
            tracing::debug!(event = %name, error = %e, "Request failed");
            GatewaySend::reply_err(Some(name), id, &e)
        }
    }
}

/// A connection belongs to at most one live session.
fn ensure_unattached(state: &AppState, connection: &mut ConnectionState) -> Result<(), SessionError> {
    let stale = match connection.membership() {
        Some(code) if state.registry.contains(code) => return Err(SessionError::AlreadyJoined),
        Some(_) => true,
        None => false,
    };
    if stale {
        connection.exit();
    }
    Ok(())
}

fn create_session(
    state: &AppState,
    connection: &mut ConnectionState,
    request: CreateSessionRequest,
) -> Result<CreateSessionResponse, SessionError> {
    ensure_unattached(state, connection)?;
    let code = state
        .registry
        .create_session(connection.connection_id, &request.moderator_name)?;
    connection.enter(code.clone());

    Ok(CreateSessionResponse {
        code,
        moderator: request.moderator_name.trim().to_string(),
        role: "moderator",
    })
}

async fn join_session(
    state: &AppState,
    connection: &mut ConnectionState,
    request: JoinSessionRequest,
) -> Result<JoinResponse, SessionError> {
    ensure_unattached(state, connection)?;
    let session = state.registry.lookup(&request.code)?;
    let nickname = session
        .join(connection.connection_id, request.nickname)
        .await?;
    connection.enter(session.code().clone());

    Ok(JoinResponse {
        code: session.code().clone(),
        nickname,
    })
}

async fn submit_questions(
    state: &AppState,
    connection: &ConnectionState,
    request: SubmitQuestionsRequest,
) -> Result<SubmitQuestionsResponse, SessionError> {
    let session = state.registry.lookup(&request.code)?;
    let questions = request.into_questions()?;
    let total = session
        .submit_questions(connection.connection_id, questions)
        .await?;
    Ok(SubmitQuestionsResponse { total })
}

async fn start_game(
    state: &AppState,
    connection: &ConnectionState,
    request: SessionRequest,
) -> Result<(), SessionError> {
    state
        .registry
        .lookup(&request.code)?
        .start_game(connection.connection_id)
        .await
}

async fn submit_answer(
    state: &AppState,
    connection: &ConnectionState,
    request: SubmitAnswerRequest,
) -> Result<AnswerResponse, SessionError> {
    let receipt = state
        .registry
        .lookup(&request.code)?
        .submit_answer(connection.connection_id, request.option_index)
        .await?;
    Ok(AnswerResponse {
        accepted: true,
        correct: receipt.correct,
    })
}

async fn end_round(
    state: &AppState,
    connection: &ConnectionState,
    request: SessionRequest,
) -> Result<(), SessionError> {
    state
        .registry
        .lookup(&request.code)?
        .end_round(connection.connection_id)
        .await
}
