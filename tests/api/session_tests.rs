//! Session API Tests

use axum::http::StatusCode;
use serde_json::Value;
use tokio_test::assert_ok;

use quiz_server::domain::value_objects::ConnectionId;

use crate::common::{question, TestApp};

#[tokio::test]
async fn test_unknown_session_is_404() {
    let server = TestApp::new().server();

    let response = server.get("/api/v1/sessions/NOPE00").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let json = response.json::<Value>();
    assert_eq!(json["code"], 10001);
    assert_eq!(json["message"], "Session not found");
}

#[tokio::test]
async fn test_session_summary() {
    let app = TestApp::new();
    let moderator = ConnectionId::new();
    let code = assert_ok!(app.state.registry.create_session(moderator, "Host"));

    let session = assert_ok!(app.state.registry.lookup(code.as_str()));
    assert_ok!(session.join(ConnectionId::new(), "Alice".into()).await);
    assert_ok!(
        session
            .submit_questions(moderator, vec![question("Q1", 0, 10), question("Q2", 1, 10)])
            .await
    );

    let server = app.server();
    let response = server
        .get(&format!("/api/v1/sessions/{}", code.as_str().to_lowercase()))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["code"], code.as_str());
    assert_eq!(json["moderator"], "Host");
    assert_eq!(json["phase"], "lobby");
    assert_eq!(json["questionCount"], 2);
    assert_eq!(json["roundActive"], false);
    assert_eq!(json["participants"][0]["nickname"], "Alice");
    assert!(json["question"].is_null());
}
