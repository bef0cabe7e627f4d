//! Annotation exclusivity and targeting tests

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use talkpanda_client::{ConversationSessionClient, SessionError};
use talkpanda_core::config::Config;
use talkpanda_core::session::{Role, TurnId};

fn client_for(server: &MockServer) -> ConversationSessionClient {
    let mut config = Config::default();
    config.backend.base_url = server.uri();
    config.ai.base_url = server.uri();
    config.backend.timeout_secs = 2;
    config.ai.timeout_secs = 2;
    ConversationSessionClient::from_config(&config)
}

async fn mount_start(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/conversation/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "sessionId": "sess-1" }
        })))
        .mount(server)
        .await;
}

async fn mount_chat_reply(server: &MockServer, user_text: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .and(body_partial_json(json!({ "text": user_text })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "text": reply }
        })))
        .mount(server)
        .await;
}

/// One exchange; returns (user turn id, assistant turn id)
async fn one_exchange(
    server: &MockServer,
    client: &ConversationSessionClient,
    user_text: &str,
) -> (TurnId, TurnId) {
    mount_chat_reply(server, user_text, "A reply").await;
    let assistant = client.send_turn(user_text).await.unwrap();
    let user = client
        .transcript()
        .turns()
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.id)
        .unwrap();
    (user, assistant.id)
}

#[tokio::test]
async fn duplicate_feedback_issues_one_request() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/ai/feedback"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({
                    "success": true,
                    "data": { "natural": true }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.start_session().await.unwrap();
    let (user_turn, _) = one_exchange(&server, &client, "I goed home").await;

    let (first, second) = tokio::join!(
        client.request_feedback(user_turn),
        client.request_feedback(user_turn)
    );

    // Exactly one wins; the loser is rejected without a network call
    // (the expect(1) above verifies the single request on drop)
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(SessionError::AnnotationAlreadyInFlight(_))
    )));
}

#[tokio::test]
async fn feedback_requests_for_different_turns_run_concurrently() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/ai/feedback"))
        .and(body_partial_json(json!({ "text": "First thing" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(150))
                .set_body_json(json!({
                    "success": true,
                    "data": { "natural": true }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ai/feedback"))
        .and(body_partial_json(json!({ "text": "Second thing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "corrected_en": "A second thing",
                "reason_ko": "관사가 필요해요"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.start_session().await.unwrap();
    let (first_turn, _) = one_exchange(&server, &client, "First thing").await;
    let (second_turn, _) = one_exchange(&server, &client, "Second thing").await;

    let (first, second) = tokio::join!(
        client.request_feedback(first_turn),
        client.request_feedback(second_turn)
    );

    assert!(!first.unwrap().corrected);
    let second = second.unwrap();
    assert!(second.corrected);
    assert_eq!(second.corrected_text.as_deref(), Some("A second thing"));
}

#[tokio::test]
async fn feedback_targets_user_turns_only() {
    let server = MockServer::start().await;
    mount_start(&server).await;

    let client = client_for(&server);
    client.start_session().await.unwrap();
    let (user_turn, assistant_turn) = one_exchange(&server, &client, "Hello").await;

    assert!(matches!(
        client.request_feedback(assistant_turn).await,
        Err(SessionError::AnnotationTargetMismatch {
            expected: Role::User,
            ..
        })
    ));
    assert!(matches!(
        client.request_suggestion(user_turn).await,
        Err(SessionError::AnnotationTargetMismatch {
            expected: Role::Assistant,
            ..
        })
    ));
}

#[tokio::test]
async fn suggestion_is_stored_on_the_turn() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/ai/example-reply"))
        .and(body_partial_json(json!({ "ai_text": "A reply" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "reply_example": "You could say: thanks a lot!" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.start_session().await.unwrap();
    let (_, assistant_turn) = one_exchange(&server, &client, "Hello").await;

    let suggestion = client.request_suggestion(assistant_turn).await.unwrap();
    assert_eq!(suggestion.text, "You could say: thanks a lot!");

    let stored = client.turn(assistant_turn).unwrap();
    assert_eq!(stored.suggestion.unwrap().text, "You could say: thanks a lot!");
}

#[tokio::test]
async fn feedback_rerequest_after_completion_replaces_record() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/ai/feedback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "corrected_en": "I went home",
                "reason_ko": "과거형이 필요해요"
            }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ai/feedback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "natural": true }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.start_session().await.unwrap();
    let (user_turn, _) = one_exchange(&server, &client, "I goed home").await;

    let first = client.request_feedback(user_turn).await.unwrap();
    assert!(first.corrected);

    // Not in flight anymore, so a new request is allowed and replaces
    let second = client.request_feedback(user_turn).await.unwrap();
    assert!(!second.corrected);
    assert!(!client.turn(user_turn).unwrap().feedback.unwrap().corrected);
}

#[tokio::test]
async fn unknown_turn_is_rejected() {
    let server = MockServer::start().await;
    mount_start(&server).await;

    let client = client_for(&server);
    client.start_session().await.unwrap();

    assert!(matches!(
        client.request_feedback(TurnId::new()).await,
        Err(SessionError::UnknownTurn(_))
    ));
}
