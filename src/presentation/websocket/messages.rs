//! WebSocket Message Types
//!
//! Gateway frame formats. Every frame is a JSON object with an opcode;
//! dispatches carry a per-connection sequence number and replies echo the
//! request id.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::application::dto::{
    CreateSessionRequest, JoinSessionRequest, SessionRequest, SubmitAnswerRequest,
    SubmitQuestionsRequest,
};
use crate::application::events::SessionEvent;
use crate::domain::value_objects::ConnectionId;
use crate::shared::error::SessionError;

/// Gateway opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Session event dispatch
    Dispatch = 0,
    /// Client request
    Request = 1,
    /// Result of a client request
    Reply = 2,
    /// Hello
    Hello = 10,
}

/// Incoming gateway message
#[derive(Debug, Deserialize)]
pub struct GatewayReceive {
    pub op: u8,
    pub t: Option<String>,
    #[serde(default)]
    pub d: Value,
    pub id: Option<Value>,
}

/// Outgoing gateway message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewaySend {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// Hello payload (op 10)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    pub connection_id: ConnectionId,
}

impl GatewaySend {
    pub fn hello(connection_id: ConnectionId) -> Self {
        Self {
            op: OpCode::Hello as u8,
            t: None,
            d: serde_json::to_value(HelloPayload { connection_id }).ok(),
            s: None,
            id: None,
        }
    }

    pub fn dispatch(event: &SessionEvent, sequence: u64) -> Self {
        Self {
            op: OpCode::Dispatch as u8,
            t: Some(event.event_name().to_string()),
            d: event.payload(),
            s: Some(sequence),
            id: None,
        }
    }

    /// Successful reply. Object results are merged next to `"ok": true`.
    pub fn reply_ok<T: Serialize>(t: Option<String>, id: Option<Value>, result: &T) -> Self {
        let body = match serde_json::to_value(result) {
            Ok(Value::Object(mut fields)) => {
                fields.insert("ok".into(), Value::Bool(true));
                Value::Object(fields)
            }
            Ok(Value::Null) => json!({ "ok": true }),
            Ok(other) => json!({ "ok": true, "result": other }),
            Err(e) => return Self::reply_err(t, id, &SessionError::MalformedPayload(e.to_string())),
        };
        Self::reply(t, id, body)
    }

    pub fn reply_err(t: Option<String>, id: Option<Value>, error: &SessionError) -> Self {
        let body = json!({
            "ok": false,
            "error": {
                "kind": error.kind(),
                "message": error.to_string(),
            },
        });
        Self::reply(t, id, body)
    }

    fn reply(t: Option<String>, id: Option<Value>, body: Value) -> Self {
        Self {
            op: OpCode::Reply as u8,
            t,
            d: Some(body),
            s: None,
            id,
        }
    }
}

/// A decoded client request.
#[derive(Debug)]
pub enum ClientRequest {
    CreateSession(CreateSessionRequest),
    JoinSession(JoinSessionRequest),
    SubmitQuestions(SubmitQuestionsRequest),
    StartGame(SessionRequest),
    SubmitAnswer(SubmitAnswerRequest),
    EndRound(SessionRequest),
}

impl ClientRequest {
    /// Decode a request by event name. Unknown names and payloads of the
    /// wrong shape are rejected as `MalformedPayload`.
    pub fn parse(name: &str, payload: Value) -> Result<Self, SessionError> {
        match name {
            "create-session" => {
                // A bare string is accepted as the moderator name.
                let request = match payload {
                    Value::String(moderator_name) => CreateSessionRequest { moderator_name },
                    other => decode(other)?,
                };
                Ok(ClientRequest::CreateSession(request))
            }
            "join-session" => Ok(ClientRequest::JoinSession(decode(payload)?)),
            "submit-questions" => Ok(ClientRequest::SubmitQuestions(decode(payload)?)),
            "start-game" => Ok(ClientRequest::StartGame(decode(payload)?)),
            "submit-answer" => Ok(ClientRequest::SubmitAnswer(decode(payload)?)),
            "end-round" => Ok(ClientRequest::EndRound(decode(payload)?)),
            other => Err(SessionError::MalformedPayload(format!(
                "unknown event `{}`",
                other
            ))),
        }
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, SessionError> {
    serde_json::from_value(payload).map_err(|e| SessionError::MalformedPayload(e.to_string()))
}
