use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{MultibotError, MultibotResult};
use crate::widget::WIDGET_SCRIPT_NAME;

/// A tenant's chatbot: the persona and instructions one embedded widget
/// talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub system_prompt: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bot {
    pub fn new(name: String, system_prompt: String) -> Self {
        let now = Utc::now();
        Self {
            id: generate_bot_id(),
            name,
            description: None,
            company_name: None,
            system_prompt,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    /// Script tag a customer pastes into their site to embed this bot.
    pub fn embed_snippet(&self, origin: &str) -> String {
        embed_snippet(origin, &self.id)
    }
}

/// `src` of the widget script for `bot_id` served from `origin`.
pub fn script_src(origin: &str, bot_id: &str) -> String {
    let bot_id: String = url::form_urlencoded::byte_serialize(bot_id.as_bytes()).collect();
    format!(
        "{}/{}?bot-id={}",
        origin.trim_end_matches('/'),
        WIDGET_SCRIPT_NAME,
        bot_id
    )
}

pub fn embed_snippet(origin: &str, bot_id: &str) -> String {
    format!(
        r#"<script src="{}" data-auto-init></script>"#,
        script_src(origin, bot_id)
    )
}

/// Bot ids are opaque strings so any id a host page passes in resolves
/// to a lookup miss rather than a parse failure.
pub fn generate_bot_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Payload for `POST /api/bots`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBot {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl NewBot {
    pub fn into_bot(self) -> MultibotResult<Bot> {
        let (Some(name), Some(system_prompt)) =
            (non_blank(self.name), non_blank(self.system_prompt))
        else {
            return Err(MultibotError::InvalidBot(
                "Name and systemPrompt are required".to_string(),
            ));
        };

        let mut bot = Bot::new(name, system_prompt);
        bot.description = non_blank(self.description);
        bot.company_name = non_blank(self.company_name);
        Ok(bot)
    }
}

/// Payload for `PUT /api/bots/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl BotUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.company_name.is_none()
            && self.system_prompt.is_none()
            && self.is_active.is_none()
    }

    pub fn apply(&self, bot: &mut Bot) -> MultibotResult<()> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(MultibotError::InvalidBot("name cannot be empty".to_string()));
        }
        if self
            .system_prompt
            .as_ref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(MultibotError::InvalidBot(
                "systemPrompt cannot be empty".to_string(),
            ));
        }

        if let Some(name) = &self.name {
            bot.name = name.clone();
        }
        if let Some(system_prompt) = &self.system_prompt {
            bot.system_prompt = system_prompt.clone();
        }
        if let Some(description) = &self.description {
            bot.description = non_blank(Some(description.clone()));
        }
        if let Some(company_name) = &self.company_name {
            bot.company_name = non_blank(Some(company_name.clone()));
        }
        if let Some(is_active) = self.is_active {
            bot.is_active = is_active;
        }
        bot.updated_at = Utc::now();
        Ok(())
    }
}
