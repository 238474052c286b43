use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CompletionSettings;
use crate::error::{MultibotError, MultibotResult};

use super::{CompletionProvider, PromptMessage};

const SERVICE_NAME: &str = "openai";

pub struct OpenAiCompletionProvider {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiCompletionProvider {
    pub fn new(settings: &CompletionSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout_secs: settings.request_timeout_secs,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base)
    }

    fn status_error(&self, status: StatusCode, retry_after: Option<u64>, body: String) -> MultibotError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                MultibotError::ApiAuthenticationFailed {
                    service: SERVICE_NAME.to_string(),
                    message: status.to_string(),
                }
            }
            StatusCode::TOO_MANY_REQUESTS => MultibotError::ApiRateLimitExceeded {
                service: SERVICE_NAME.to_string(),
                retry_after_secs: retry_after.unwrap_or(60),
            },
            s if s.is_server_error() => {
                MultibotError::ApiServiceUnavailable(format!("{}: {}", status, body))
            }
            _ => MultibotError::ApiRequestFailed(format!("{}: {}", status, body)),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    fn provider_name(&self) -> &str {
        SERVICE_NAME
    }

    async fn complete(&self, messages: &[PromptMessage]) -> MultibotResult<Option<String>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| MultibotError::ApiAuthenticationFailed {
                service: SERVICE_NAME.to_string(),
                message: "no API key configured".to_string(),
            })?;

        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(model = %self.model, messages = messages.len(), "Requesting completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MultibotError::ApiTimeout(self.timeout_secs)
                } else {
                    MultibotError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let text = response.text().await.unwrap_or_default();
            warn!("Completion API returned status: {}", status);
            return Err(self.status_error(status, retry_after, text));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| MultibotError::ApiParseError(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty()))
    }
}
