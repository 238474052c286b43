use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{ChatRequest, ChatResponse};

use super::FrameError;

/// The subset of a bot record the chat frame needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    pub system_prompt: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

fn api_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Loads bot configuration from `GET {origin}/api/bots/{id}`.
#[derive(Debug, Clone)]
pub struct BotConfigClient {
    client: Client,
    base_url: String,
}

impl BotConfigClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, bot_id: &str) -> Result<BotProfile, FrameError> {
        let encoded: String = url::form_urlencoded::byte_serialize(bot_id.as_bytes()).collect();
        let url = api_url(&self.base_url, &format!("/api/bots/{}", encoded));
        debug!("Fetching bot configuration from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FrameError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FrameError::BotNotFound);
        }
        if !status.is_success() {
            let body: Option<ErrorBody> = response.json().await.ok();
            if body.is_some_and(|b| b.error == "Bot is not active") {
                return Err(FrameError::BotInactive);
            }
            warn!("Bot configuration request returned status: {}", status);
            return Err(FrameError::LoadFailed(status.as_u16()));
        }

        let profile: BotProfile = response
            .json()
            .await
            .map_err(|e| FrameError::Network(e.to_string()))?;

        if !profile.is_active {
            return Err(FrameError::BotInactive);
        }

        Ok(profile)
    }
}

/// Sends one chat turn to `POST {origin}/api/chat`.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, FrameError> {
        let response = self
            .client
            .post(api_url(&self.base_url, "/api/chat"))
            .json(request)
            .send()
            .await
            .map_err(|e| FrameError::ChatFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FrameError::ChatFailed(format!("status {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| FrameError::ChatFailed(e.to_string()))
    }
}
