//! End-to-end session flows through the registry and session workers.
//!
//! Every test runs on paused tokio time, so deadlines and the pause between
//! rounds fire exactly when the test advances the clock past them. A
//! `summary()` round trip is used as a barrier: the worker answers it only
//! after everything queued before it has been applied.

use pretty_assertions::assert_eq;

use quiz_server::application::events::SessionEvent;
use quiz_server::domain::entities::{Departure, SessionPhase};
use quiz_server::domain::value_objects::ConnectionId;
use quiz_server::shared::error::SessionError;

use crate::common::{advance, question, registry, rows};

fn last_round_ended(events: &[SessionEvent]) -> Option<(Vec<(String, u32, u32)>, usize)> {
    events.iter().rev().find_map(|event| match event {
        SessionEvent::RoundEnded(ended) => Some((rows(&ended.scoreboard), ended.correct_index)),
        _ => None,
    })
}

fn row(nickname: &str, score: u32, rank: u32) -> (String, u32, u32) {
    (nickname.to_string(), score, rank)
}

#[tokio::test(start_paused = true)]
async fn test_nickname_taken_case_insensitive() {
    let (registry, _) = registry();
    let code = registry.create_session(ConnectionId::new(), "M").unwrap();
    let session = registry.lookup(code.as_str()).unwrap();

    assert_eq!(
        session.join(ConnectionId::new(), "Alice".into()).await,
        Ok("Alice".to_string())
    );
    assert_eq!(
        session.join(ConnectionId::new(), "alice".into()).await,
        Err(SessionError::NicknameTaken)
    );
    assert_eq!(
        session.join(ConnectionId::new(), "   ".into()).await,
        Err(SessionError::EmptyNickname)
    );

    let summary = session.summary().await.unwrap();
    assert_eq!(summary.roster.participants.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_all_answered_resolves_early_then_advances() {
    let (registry, sink) = registry();
    let moderator = ConnectionId::new();
    let (alice, bob) = (ConnectionId::new(), ConnectionId::new());
    let code = registry.create_session(moderator, "M").unwrap();
    let session = registry.lookup(code.as_str()).unwrap();

    session.join(alice, "Alice".into()).await.unwrap();
    session.join(bob, "Bob".into()).await.unwrap();
    let total = session
        .submit_questions(moderator, vec![question("Q1", 1, 10), question("Q2", 2, 10)])
        .await
        .unwrap();
    assert_eq!(total, 2);
    session.start_game(moderator).await.unwrap();

    assert!(session.submit_answer(bob, 1).await.unwrap().correct);
    let last = session.submit_answer(alice, 1).await.unwrap();
    assert!(last.correct);
    assert!(last.round_complete);

    let summary = session.summary().await.unwrap();
    assert_eq!(summary.phase, SessionPhase::RoundResolved);
    assert_eq!(
        last_round_ended(&sink.events_for(&alice)),
        Some((vec![row("Alice", 1, 1), row("Bob", 1, 1)], 1))
    );
    assert_eq!(
        sink.names_for(&alice),
        vec!["roster-updated", "roster-updated", "round-started", "round-ended"]
    );
    assert_eq!(
        sink.names_for(&moderator),
        vec![
            "session-created",
            "roster-updated",
            "roster-updated",
            "round-started",
            "round-ended"
        ]
    );

    // The pause elapses and the second question launches on its own.
    advance(2_100).await;
    let summary = session.summary().await.unwrap();
    assert_eq!(summary.phase, SessionPhase::RoundActive);
    let current = summary.roster.question.unwrap();
    assert_eq!((current.index, current.total), (2, 2));
    assert_eq!(sink.count_for(&bob, "round-started"), 2);
    assert_eq!(sink.count_for(&bob, "round-ended"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_without_answers_keeps_scores() {
    let (registry, sink) = registry();
    let moderator = ConnectionId::new();
    let (alice, bob) = (ConnectionId::new(), ConnectionId::new());
    let code = registry.create_session(moderator, "M").unwrap();
    let session = registry.lookup(code.as_str()).unwrap();

    session.join(alice, "Alice".into()).await.unwrap();
    session.join(bob, "Bob".into()).await.unwrap();
    session
        .submit_questions(moderator, vec![question("Q1", 0, 3), question("Q2", 0, 3)])
        .await
        .unwrap();
    session.start_game(moderator).await.unwrap();

    // Round 1: Alice right, Bob wrong.
    session.submit_answer(alice, 0).await.unwrap();
    assert!(!session.submit_answer(bob, 2).await.unwrap().correct);

    // Round 2 launches at 2s and nobody answers before its 3s deadline.
    advance(2_100).await;
    advance(3_000).await;
    session.summary().await.unwrap();

    let board = vec![row("Alice", 1, 1), row("Bob", 0, 2)];
    assert_eq!(
        last_round_ended(&sink.events_for(&bob)),
        Some((board.clone(), 0))
    );
    assert_eq!(sink.count_for(&bob, "round-ended"), 2);

    advance(2_000).await;
    let summary = session.summary().await.unwrap();
    assert_eq!(summary.phase, SessionPhase::GameFinished);
    assert!(summary.roster.question.is_none());

    let finished = sink
        .events_for(&bob)
        .into_iter()
        .find_map(|event| match event {
            SessionEvent::GameFinished(finished) => Some(rows(&finished.scoreboard)),
            _ => None,
        });
    assert_eq!(finished, Some(board));
}

#[tokio::test(start_paused = true)]
async fn test_moderator_disconnect_closes_session() {
    let (registry, sink) = registry();
    let moderator = ConnectionId::new();
    let (alice, bob) = (ConnectionId::new(), ConnectionId::new());
    let code = registry.create_session(moderator, "M").unwrap();
    let session = registry.lookup(code.as_str()).unwrap();

    session.join(alice, "Alice".into()).await.unwrap();
    session.join(bob, "Bob".into()).await.unwrap();
    session
        .submit_questions(moderator, vec![question("Q1", 0, 10)])
        .await
        .unwrap();
    session.start_game(moderator).await.unwrap();
    advance(1_500).await;

    let departure = registry.leave(&code, moderator).await.unwrap();
    assert_eq!(departure, Departure::Moderator);

    for participant in [alice, bob] {
        assert_eq!(sink.names_for(&participant).last(), Some(&"session-closed"));
    }

    // Neither the deadline nor the pause may deliver anything afterwards.
    let delivered = sink.total();
    advance(20_000).await;
    assert_eq!(sink.total(), delivered);

    assert_eq!(
        registry.lookup(code.as_str()).unwrap_err(),
        SessionError::SessionNotFound
    );
    assert_eq!(
        session.submit_answer(alice, 0).await,
        Err(SessionError::SessionNotFound)
    );
    assert_eq!(registry.session_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_late_joiner_resynchronizes() {
    let (registry, sink) = registry();
    let moderator = ConnectionId::new();
    let (alice, bob) = (ConnectionId::new(), ConnectionId::new());
    let code = registry.create_session(moderator, "M").unwrap();
    let session = registry.lookup(code.as_str()).unwrap();

    session.join(alice, "Alice".into()).await.unwrap();
    session
        .submit_questions(moderator, vec![question("Q1", 0, 10)])
        .await
        .unwrap();
    session.start_game(moderator).await.unwrap();

    advance(3_500).await;
    session.join(bob, "Bob".into()).await.unwrap();

    let first = sink.events_for(&bob).into_iter().next();
    let Some(SessionEvent::RosterUpdated(roster)) = first else {
        panic!("late joiner should first receive the roster, got {:?}", first);
    };
    assert!(roster.round_active);
    assert_eq!(roster.time_remaining, 7);
    assert_eq!(roster.question.map(|q| q.index), Some(1));
    let names: Vec<_> = roster.participants.iter().map(|p| p.nickname.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test(start_paused = true)]
async fn test_departure_completes_round() {
    let (registry, sink) = registry();
    let moderator = ConnectionId::new();
    let (alice, bob) = (ConnectionId::new(), ConnectionId::new());
    let code = registry.create_session(moderator, "M").unwrap();
    let session = registry.lookup(code.as_str()).unwrap();

    session.join(alice, "Alice".into()).await.unwrap();
    session.join(bob, "Bob".into()).await.unwrap();
    session
        .submit_questions(moderator, vec![question("Q1", 0, 10), question("Q2", 0, 10)])
        .await
        .unwrap();
    session.start_game(moderator).await.unwrap();
    session.submit_answer(alice, 0).await.unwrap();

    let departure = registry.leave(&code, bob).await.unwrap();
    assert!(matches!(departure, Departure::Participant { round_complete: true, .. }));

    session.summary().await.unwrap();
    let names = sink.names_for(&alice);
    assert_eq!(&names[names.len() - 2..], &["roster-updated", "round-ended"]);
    assert_eq!(
        last_round_ended(&sink.events_for(&alice)),
        Some((vec![row("Alice", 1, 1)], 0))
    );
}

#[tokio::test(start_paused = true)]
async fn test_request_errors_leave_state_untouched() {
    let (registry, _) = registry();
    let moderator = ConnectionId::new();
    let alice = ConnectionId::new();
    let code = registry.create_session(moderator, "M").unwrap();
    let session = registry.lookup(code.as_str()).unwrap();
    session.join(alice, "Alice".into()).await.unwrap();

    assert_eq!(session.start_game(moderator).await, Err(SessionError::NoQuestions));
    assert_eq!(session.end_round(moderator).await, Err(SessionError::NoActiveRound));
    assert_eq!(session.submit_answer(alice, 0).await, Err(SessionError::NoActiveRound));

    session
        .submit_questions(moderator, vec![question("Q1", 0, 10)])
        .await
        .unwrap();
    assert_eq!(session.start_game(alice).await, Err(SessionError::NotModerator));
    session.start_game(moderator).await.unwrap();
    assert_eq!(session.start_game(moderator).await, Err(SessionError::GameInProgress));

    assert_eq!(
        session.submit_answer(alice, 5).await,
        Err(SessionError::InvalidOption { index: 5, count: 3 })
    );
    assert_eq!(
        session.submit_answer(moderator, 0).await,
        Err(SessionError::NotAParticipant)
    );
    session.submit_answer(alice, 0).await.unwrap();
    assert_eq!(
        session.submit_answer(alice, 0).await,
        Err(SessionError::NoActiveRound)
    );

    let summary = session.summary().await.unwrap();
    assert_eq!(summary.roster.participants[0].score, 1);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_notifies_everyone() {
    let (registry, sink) = registry();
    let moderator = ConnectionId::new();
    let alice = ConnectionId::new();
    let code = registry.create_session(moderator, "M").unwrap();
    registry
        .lookup(code.as_str())
        .unwrap()
        .join(alice, "Alice".into())
        .await
        .unwrap();

    registry.destroy(&code).await.unwrap();

    assert_eq!(sink.names_for(&alice).last(), Some(&"session-closed"));
    assert_eq!(sink.names_for(&moderator).last(), Some(&"session-closed"));
    assert_eq!(registry.session_count(), 0);
    assert_eq!(registry.destroy(&code).await, Err(SessionError::SessionNotFound));
}
