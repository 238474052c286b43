//! Logic of the chat page that runs inside the widget's iframe.
//!
//! The frame reads its bot id from its own URL, loads the bot's
//! configuration, announces itself to the parent window and then runs the
//! conversation against the chat endpoint.

mod client;
mod reveal;

pub use client::{BotConfigClient, BotProfile, ChatClient};
pub use reveal::{Reveal, DEFAULT_REVEAL_INTERVAL};

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::models::{ChatContext, ChatMessage, ChatRequest};
use crate::widget::{ControlMessage, Lifecycle};

/// Assistant text shown when a chat turn fails.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Welcome text for bots without a description.
pub const DEFAULT_WELCOME: &str = "How can I help you today?";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("[E7001] No bot id in frame URL")]
    MissingBotId,

    #[error("[E7002] Bot not found")]
    BotNotFound,

    #[error("[E7003] Bot configuration request failed with status {0}")]
    LoadFailed(u16),

    #[error("[E7004] Bot is inactive")]
    BotInactive,

    #[error("[E7005] Bot configuration unreachable: {0}")]
    Network(String),

    #[error("[E7006] Chat request failed: {0}")]
    ChatFailed(String),

    #[error("[E7007] Parent window unavailable: {0}")]
    ChannelClosed(String),
}

impl FrameError {
    /// Text shown in the frame and forwarded to the controller as
    /// `CHATBOT_ERROR`.
    pub fn user_message(&self) -> &'static str {
        match self {
            FrameError::MissingBotId => "No bot ID provided. Please specify a bot ID in the URL.",
            FrameError::BotNotFound => "Bot not found. Please check your bot ID.",
            FrameError::LoadFailed(_) => "Failed to load bot configuration.",
            FrameError::BotInactive => "This bot is currently inactive. Please contact support.",
            FrameError::Network(_) => "Failed to load bot configuration. Please try again.",
            FrameError::ChatFailed(_) | FrameError::ChannelClosed(_) => CHAT_ERROR_REPLY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FrameError::MissingBotId => "E7001",
            FrameError::BotNotFound => "E7002",
            FrameError::LoadFailed(_) => "E7003",
            FrameError::BotInactive => "E7004",
            FrameError::Network(_) => "E7005",
            FrameError::ChatFailed(_) => "E7006",
            FrameError::ChannelClosed(_) => "E7007",
        }
    }
}

/// The frame's side of the cross-document channel: messages to the parent
/// (the widget controller's window).
pub trait FrameChannel {
    fn post_to_parent(&mut self, message: &ControlMessage) -> Result<(), FrameError>;

    /// False when the page is loaded top-level rather than in an iframe.
    fn is_embedded(&self) -> bool {
        true
    }
}

impl FrameChannel for mpsc::UnboundedSender<ControlMessage> {
    fn post_to_parent(&mut self, message: &ControlMessage) -> Result<(), FrameError> {
        self.send(message.clone())
            .map_err(|e| FrameError::ChannelClosed(e.to_string()))
    }
}

/// Read `bot-id` from the frame's own URL.
pub fn bot_id_from_url(frame_url: &str) -> Option<String> {
    Url::parse(frame_url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "bot-id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

pub struct EmbeddedFrame<C: FrameChannel> {
    channel: C,
    bots: BotConfigClient,
    chat: ChatClient,
    bot: Option<BotProfile>,
    error: Option<FrameError>,
    session_id: String,
    transcript: Vec<ChatMessage>,
    visibility: Lifecycle,
    reveal_interval: Duration,
}

impl<C: FrameChannel> EmbeddedFrame<C> {
    /// A frame talking to the API at `api_origin`.
    pub fn new(api_origin: &str, channel: C) -> Self {
        Self::with_clients(
            BotConfigClient::new(api_origin),
            ChatClient::new(api_origin),
            channel,
        )
    }

    pub fn with_clients(bots: BotConfigClient, chat: ChatClient, channel: C) -> Self {
        Self {
            channel,
            bots,
            chat,
            bot: None,
            error: None,
            session_id: Uuid::new_v4().simple().to_string(),
            transcript: Vec::new(),
            visibility: Lifecycle::Closed,
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
        }
    }

    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    /// Load the bot named in `frame_url`, then announce `CHATBOT_READY`, or
    /// `CHATBOT_ERROR` with the user-visible text on failure.
    pub async fn load(&mut self, frame_url: &str) -> Result<&BotProfile, FrameError> {
        let result = match bot_id_from_url(frame_url) {
            Some(bot_id) => self.bots.fetch(&bot_id).await,
            None => Err(FrameError::MissingBotId),
        };

        match result {
            Ok(profile) => {
                info!(bot_id = %profile.id, "Loaded bot '{}'", profile.name);
                self.error = None;
                if self.channel.is_embedded() {
                    self.post(&ControlMessage::Ready);
                }
                Ok(&*self.bot.insert(profile))
            }
            Err(e) => {
                error!(error_code = e.error_code(), "Error fetching bot config: {}", e);
                self.post(&ControlMessage::Error {
                    error: e.user_message().to_string(),
                });
                self.bot = None;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Run one chat turn. Blank input, or input before a bot is loaded, is
    /// ignored. Returns the assistant message appended to the transcript.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }
        let Some(bot) = self.bot.as_ref() else {
            warn!("Ignoring message before bot configuration is loaded");
            return None;
        };

        let request = ChatRequest {
            message: content.to_string(),
            session_id: Some(self.session_id.clone()),
            context: Some(ChatContext::home_services(bot.system_prompt.clone())),
        };
        self.transcript.push(ChatMessage::user(content));

        let reply = match self.chat.send(&request).await {
            Ok(response) => {
                self.session_id = response.session_id;
                response.message
            }
            Err(e) => {
                error!(error_code = e.error_code(), "Error sending message: {}", e);
                CHAT_ERROR_REPLY.to_string()
            }
        };
        self.transcript.push(ChatMessage::assistant(reply));

        self.post(&ControlMessage::MessageSent {
            message: content.to_string(),
        });

        self.transcript.last()
    }

    /// Handle a message from the controller's window.
    pub async fn handle_message(&mut self, data: &Value) {
        let Some(message) = ControlMessage::from_value(data) else {
            debug!("Ignoring unrecognised parent message");
            return;
        };

        match message {
            ControlMessage::Open => self.visibility = Lifecycle::Open,
            ControlMessage::Close => self.visibility = Lifecycle::Closed,
            ControlMessage::Minimize => self.visibility = Lifecycle::Minimized,
            ControlMessage::SendMessage { message } => {
                self.send(&message).await;
            }
            other => debug!(
                message_type = other.type_name(),
                "Ignoring controller-bound message type"
            ),
        }
    }

    /// Playback of the latest assistant reply.
    pub fn reveal_latest(&self) -> Option<Reveal> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == crate::models::ChatRole::Assistant)
            .map(|m| Reveal::new(m.content.clone()).with_interval(self.reveal_interval))
    }

    pub fn bot(&self) -> Option<&BotProfile> {
        self.bot.as_ref()
    }

    pub fn error(&self) -> Option<&FrameError> {
        self.error.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn visibility(&self) -> Lifecycle {
        self.visibility
    }

    pub fn title(&self) -> Option<String> {
        self.bot.as_ref().map(|b| format!("{} | Chat Widget", b.name))
    }

    pub fn welcome_text(&self) -> &str {
        self.bot
            .as_ref()
            .and_then(|b| b.description.as_deref())
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_WELCOME)
    }

    /// Start a fresh conversation.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.session_id = Uuid::new_v4().simple().to_string();
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn post(&mut self, message: &ControlMessage) {
        if let Err(e) = self.channel.post_to_parent(message) {
            warn!("Could not notify parent window: {}", e);
        }
    }
}
