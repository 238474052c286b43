#![allow(
    clippy::needless_borrows_for_generic_args,
    clippy::derivable_impls,
    clippy::type_complexity,
    clippy::len_zero
)]

pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod frame;
pub mod models;
pub mod repo;
pub mod server;
pub mod widget;

pub use completion::{
    build_messages, generate_suggestions, CompletionProvider, OpenAiCompletionProvider,
    PromptMessage, DEFAULT_SYSTEM_PROMPT, FALLBACK_REPLY,
};
pub use config::{
    get_config_dir, CompletionSettings, ConfigLoadError, DatabaseSettings, LoggingConfig,
    MultibotConfig, ServerSettings, StorageBackend,
};
pub use db::{Database, DatabaseConfig, DatabaseError};
pub use error::{CliErrorDisplay, MultibotError, MultibotResult};
pub use frame::{
    BotConfigClient, BotProfile, ChatClient, EmbeddedFrame, FrameChannel, FrameError, Reveal,
};
pub use models::{
    Bot, BotUpdate, ChatContext, ChatMessage, ChatRequest, ChatResponse, ChatRole, NewBot,
};
pub use repo::{BotRepository, BotStore, MemoryBotStore};
pub use server::{router, ApiError, AppState, MultibotServer};
pub use widget::{
    ControlMessage, Lifecycle, MemoryHost, OriginPolicy, Position, ReadinessPolicy, ScriptTag, Theme,
    ToggleBehavior, WidgetConfig, WidgetConfigOverrides, WidgetController, WidgetError,
    WidgetHost, WidgetState,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
