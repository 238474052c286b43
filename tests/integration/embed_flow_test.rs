#![allow(dead_code, unused_imports)]

//! End-to-end: API server, embedded frame and widget controller wired
//! together the way a browser would relay postMessage between them.

use std::sync::Arc;

use async_trait::async_trait;
use multibot_core::completion::{CompletionProvider, PromptMessage};
use multibot_core::config::ServerSettings;
use multibot_core::error::MultibotResult;
use multibot_core::frame::EmbeddedFrame;
use multibot_core::models::{script_src, Bot};
use multibot_core::repo::MemoryBotStore;
use multibot_core::server::{AppState, MultibotServer};
use multibot_core::widget::{
    ControlMessage, Lifecycle, MemoryHost, MessageTarget, WidgetConfigOverrides, WidgetController,
    IFRAME_CLASS,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

struct EchoCompletion;

#[async_trait]
impl CompletionProvider for EchoCompletion {
    fn provider_name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, messages: &[PromptMessage]) -> MultibotResult<Option<String>> {
        Ok(messages.last().map(|m| format!("You said: {}", m.content)))
    }
}

struct Harness {
    server: MultibotServer,
    widget: WidgetController<MemoryHost>,
    frame: EmbeddedFrame<mpsc::UnboundedSender<ControlMessage>>,
    from_frame: mpsc::UnboundedReceiver<ControlMessage>,
}

impl Harness {
    async fn start(bots: Vec<Bot>, script_bot_id: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let state = AppState::new(
            Arc::new(MemoryBotStore::with_bots(bots)),
            Arc::new(EchoCompletion),
        );
        let server = MultibotServer::start_on(listener, state, &ServerSettings::default()).unwrap();

        let host = MemoryHost::new("https://customer.example.com/contact")
            .with_script(script_src(&server.url(), script_bot_id));
        let widget = WidgetController::new(host);

        let (tx, from_frame) = mpsc::unbounded_channel();
        let frame = EmbeddedFrame::new(&server.url(), tx);

        Self {
            server,
            widget,
            frame,
            from_frame,
        }
    }

    fn iframe_src(&self) -> String {
        let host = self.widget.host();
        let iframe = host.query_class(IFRAME_CLASS)[0];
        host.node(iframe)
            .and_then(|n| n.attribute("src"))
            .unwrap()
            .to_string()
    }

    /// Deliver everything the frame posted to the widget's window.
    fn relay_to_widget(&mut self) -> Vec<ControlMessage> {
        let origin = self.server.url();
        let mut delivered = Vec::new();
        while let Ok(message) = self.from_frame.try_recv() {
            self.widget.on_message(&origin, &message.to_value());
            delivered.push(message);
        }
        delivered
    }

    /// Deliver everything the widget posted into the frame.
    async fn relay_to_frame(&mut self) -> Vec<ControlMessage> {
        let expected_origin = self.server.url();
        let posted = self.widget.host_mut().take_posted();
        let mut delivered = Vec::new();
        for post in posted {
            if !matches!(post.target, MessageTarget::Frame(_)) {
                continue;
            }
            assert_eq!(post.target_origin, expected_origin);
            self.frame.handle_message(&post.message.to_value()).await;
            delivered.push(post.message);
        }
        delivered
    }
}

#[tokio::test]
async fn test_full_embed_flow() {
    let bot = Bot::new(
        "Acme Helper".to_string(),
        "You are Acme's assistant.".to_string(),
    );
    let mut h = Harness::start(vec![bot.clone()], &bot.id).await;

    h.widget.init(WidgetConfigOverrides::default());
    assert!(h.widget.is_ready());
    assert!(!h.widget.is_frame_ready());

    let src = h.iframe_src();
    assert_eq!(src, format!("{}/embed?bot-id={}", h.server.url(), bot.id));

    let profile = h.frame.load(&src).await.unwrap();
    assert_eq!(profile.name, "Acme Helper");
    assert_eq!(h.relay_to_widget(), vec![ControlMessage::Ready]);
    assert!(h.widget.is_frame_ready());

    h.widget.open();
    assert_eq!(h.relay_to_frame().await, vec![ControlMessage::Open]);
    assert_eq!(h.frame.visibility(), Lifecycle::Open);

    h.widget.send_message("Do you fix boilers?");
    h.relay_to_frame().await;

    let transcript = h.frame.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].content, "You said: Do you fix boilers?");

    assert_eq!(
        h.relay_to_widget(),
        vec![ControlMessage::MessageSent {
            message: "Do you fix boilers?".to_string()
        }]
    );

    h.widget.minimize();
    h.relay_to_frame().await;
    assert_eq!(h.frame.visibility(), Lifecycle::Minimized);

    h.widget.destroy();
    assert!(h.widget.host().body().is_empty());

    h.server.stop().await;
}

#[tokio::test]
async fn test_unknown_bot_surfaces_configuration_error() {
    let mut h = Harness::start(Vec::new(), "does-not-exist").await;

    h.widget.init(WidgetConfigOverrides::default());
    let src = h.iframe_src();

    assert!(h.frame.load(&src).await.is_err());
    h.relay_to_widget();

    assert!(!h.widget.is_frame_ready());
    assert_eq!(
        h.widget.last_frame_error(),
        Some("Bot not found. Please check your bot ID.")
    );

    h.server.stop().await;
}

#[tokio::test]
async fn test_inactive_bot_surfaces_error() {
    let mut bot = Bot::new("Paused".to_string(), "prompt".to_string());
    bot.is_active = false;
    let mut h = Harness::start(vec![bot.clone()], &bot.id).await;

    h.widget.init(WidgetConfigOverrides::default());
    let src = h.iframe_src();
    assert!(h.frame.load(&src).await.is_err());
    h.relay_to_widget();

    assert_eq!(
        h.widget.last_frame_error(),
        Some("This bot is currently inactive. Please contact support.")
    );

    h.server.stop().await;
}

#[tokio::test]
async fn test_messages_from_foreign_origin_are_ignored() {
    let bot = Bot::new("Acme Helper".to_string(), "prompt".to_string());
    let mut h = Harness::start(vec![bot.clone()], &bot.id).await;
    h.widget.init(WidgetConfigOverrides::default());

    h.widget
        .on_message("https://evil.example", &json!({ "type": "CHATBOT_READY" }));
    assert!(!h.widget.is_frame_ready());

    h.server.stop().await;
}
