mod bot;
mod chat;

pub use bot::{embed_snippet, generate_bot_id, script_src, Bot, BotUpdate, NewBot};
pub use chat::{ChatContext, ChatMessage, ChatRequest, ChatResponse, ChatRole};
