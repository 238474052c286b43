use multibot_core::frame::{
    bot_id_from_url, EmbeddedFrame, FrameError, CHAT_ERROR_REPLY, DEFAULT_WELCOME,
};
use multibot_core::models::ChatRole;
use multibot_core::widget::{ControlMessage, Lifecycle};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bot_json(id: &str, active: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Acme Helper",
        "description": "Ask me about your plumbing.",
        "companyName": "Acme",
        "systemPrompt": "You are Acme's plumbing assistant.",
        "isActive": active,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z"
    })
}

fn frame_for(
    server: &MockServer,
) -> (
    EmbeddedFrame<mpsc::UnboundedSender<ControlMessage>>,
    mpsc::UnboundedReceiver<ControlMessage>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EmbeddedFrame::new(&server.uri(), tx), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ControlMessage>) -> Vec<ControlMessage> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        out.push(message);
    }
    out
}

#[test]
fn test_bot_id_from_url() {
    assert_eq!(
        bot_id_from_url("https://bots.example.net/embed?bot-id=abc123").as_deref(),
        Some("abc123")
    );
    assert_eq!(bot_id_from_url("https://bots.example.net/embed?bot-id="), None);
    assert_eq!(bot_id_from_url("https://bots.example.net/embed"), None);
    assert_eq!(bot_id_from_url("not a url"), None);
}

#[tokio::test]
async fn test_load_posts_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bot_json("abc123", true)))
        .expect(1)
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    let profile = frame
        .load(&format!("{}/embed?bot-id=abc123", server.uri()))
        .await
        .unwrap();
    assert_eq!(profile.name, "Acme Helper");

    assert_eq!(drain(&mut rx), vec![ControlMessage::Ready]);
    assert_eq!(frame.title().as_deref(), Some("Acme Helper | Chat Widget"));
    assert_eq!(frame.welcome_text(), "Ask me about your plumbing.");
    assert!(frame.error().is_none());
}

#[tokio::test]
async fn test_load_unknown_bot_posts_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Bot not found" })))
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    let err = frame
        .load(&format!("{}/embed?bot-id=missing", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err, FrameError::BotNotFound);
    assert_eq!(
        drain(&mut rx),
        vec![ControlMessage::Error {
            error: "Bot not found. Please check your bot ID.".to_string()
        }]
    );
    assert!(frame.bot().is_none());
    assert_eq!(frame.welcome_text(), DEFAULT_WELCOME);
}

#[tokio::test]
async fn test_load_inactive_bot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/paused"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Bot is not active" })),
        )
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    let err = frame
        .load(&format!("{}/embed?bot-id=paused", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err, FrameError::BotInactive);
    let posted = drain(&mut rx);
    assert_eq!(
        posted,
        vec![ControlMessage::Error {
            error: "This bot is currently inactive. Please contact support.".to_string()
        }]
    );
}

#[tokio::test]
async fn test_load_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/abc123"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to fetch bot" })))
        .mount(&server)
        .await;

    let (mut frame, _rx) = frame_for(&server);
    let err = frame
        .load(&format!("{}/embed?bot-id=abc123", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err, FrameError::LoadFailed(500));
    assert_eq!(frame.error(), Some(&FrameError::LoadFailed(500)));
}

#[tokio::test]
async fn test_load_without_bot_id_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    let err = frame
        .load(&format!("{}/embed", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err, FrameError::MissingBotId);
    assert!(matches!(drain(&mut rx)[0], ControlMessage::Error { .. }));
}

#[tokio::test]
async fn test_send_message_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bot_json("abc123", true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "message": "Is there a call-out fee?",
            "context": {
                "industry": "Home Services",
                "systemPrompt": "You are Acme's plumbing assistant."
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Call-outs are free this month.",
            "sessionId": "server-session",
            "suggestions": ["Schedule a service appointment"],
            "confidence": 0.9
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    frame
        .load(&format!("{}/embed?bot-id=abc123", server.uri()))
        .await
        .unwrap();
    drain(&mut rx);

    let reply = frame.send("  Is there a call-out fee?  ").await.unwrap();
    assert_eq!(reply.role, ChatRole::Assistant);
    assert_eq!(reply.content, "Call-outs are free this month.");

    assert_eq!(frame.session_id(), "server-session");
    assert_eq!(frame.transcript().len(), 2);
    assert_eq!(frame.transcript()[0].content, "Is there a call-out fee?");
    assert_eq!(
        drain(&mut rx),
        vec![ControlMessage::MessageSent {
            message: "Is there a call-out fee?".to_string()
        }]
    );

    let reveal = frame.reveal_latest().unwrap();
    assert_eq!(reveal.frames().last(), Some("Call-outs are free this month."));
}

#[tokio::test]
async fn test_zero_reveal_interval_disables_animation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bot_json("abc123", true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Yes.",
            "sessionId": "s1",
            "suggestions": [],
            "confidence": 0.9
        })))
        .mount(&server)
        .await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let mut frame = EmbeddedFrame::new(&server.uri(), tx).with_reveal_interval(Duration::ZERO);
    frame
        .load(&format!("{}/embed?bot-id=abc123", server.uri()))
        .await
        .unwrap();
    frame.send("Open today?").await.unwrap();

    let reveal = frame.reveal_latest().unwrap();
    let mut shown = Vec::new();
    reveal.play(|f| shown.push(f.to_string())).await;
    assert_eq!(shown, vec!["Y", "Ye", "Yes", "Yes."]);
}

#[tokio::test]
async fn test_send_failure_shows_apology() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bot_json("abc123", true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "Internal server error" })),
        )
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    frame
        .load(&format!("{}/embed?bot-id=abc123", server.uri()))
        .await
        .unwrap();
    let session = frame.session_id().to_string();

    let reply = frame.send("hello").await.unwrap();
    assert_eq!(reply.content, CHAT_ERROR_REPLY);
    assert_eq!(frame.session_id(), session);
    assert!(drain(&mut rx).contains(&ControlMessage::MessageSent {
        message: "hello".to_string()
    }));
}

#[tokio::test]
async fn test_blank_or_premature_send_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    assert!(frame.send("hello").await.is_none());
    assert!(frame.send("   ").await.is_none());
    assert!(frame.transcript().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_parent_commands() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bots/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bot_json("abc123", true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Hi there!",
            "sessionId": "s-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut frame, mut rx) = frame_for(&server);
    frame
        .load(&format!("{}/embed?bot-id=abc123", server.uri()))
        .await
        .unwrap();
    drain(&mut rx);

    frame.handle_message(&json!({ "type": "CHATBOT_OPEN" })).await;
    assert_eq!(frame.visibility(), Lifecycle::Open);
    frame.handle_message(&json!({ "type": "CHATBOT_MINIMIZE" })).await;
    assert_eq!(frame.visibility(), Lifecycle::Minimized);
    frame.handle_message(&json!({ "type": "CHATBOT_CLOSE" })).await;
    assert_eq!(frame.visibility(), Lifecycle::Closed);

    frame.handle_message(&json!({ "type": "SOMETHING_ELSE" })).await;
    frame.handle_message(&json!("not an object")).await;

    frame
        .handle_message(&json!({ "type": "CHATBOT_SEND_MESSAGE", "message": "hi" }))
        .await;
    assert_eq!(frame.transcript().len(), 2);
    assert_eq!(frame.transcript()[1].content, "Hi there!");
}
