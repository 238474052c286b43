//! Chat completion: prompt assembly and the upstream language-model client.

mod openai;
mod prompt;

pub use openai::OpenAiCompletionProvider;
pub use prompt::{
    build_messages, context_message, generate_suggestions, DEFAULT_CONFIDENCE,
    DEFAULT_SYSTEM_PROMPT, FALLBACK_REPLY,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MultibotResult;
use crate::models::ChatRole;

/// One message in the list sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: ChatRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Returns the text of the first choice, or `None` when the upstream
    /// answered without content.
    async fn complete(&self, messages: &[PromptMessage]) -> MultibotResult<Option<String>>;
}
