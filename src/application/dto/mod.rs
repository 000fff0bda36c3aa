//! Data Transfer Objects
//!
//! Inbound request payloads and the results returned to the requester.

pub mod request;
pub mod response;

pub use request::{
    CreateSessionRequest, JoinSessionRequest, QuestionPayload, SessionRequest,
    SubmitAnswerRequest, SubmitQuestionsRequest,
};
pub use response::{
    AnswerResponse, CreateSessionResponse, JoinResponse, SubmitQuestionsResponse,
};
