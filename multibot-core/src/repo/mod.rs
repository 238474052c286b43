mod bot_repo;
mod memory;

pub use bot_repo::BotRepository;
pub use memory::MemoryBotStore;

use crate::db::DatabaseError;
use crate::models::Bot;
use async_trait::async_trait;

/// Storage for bot records. The HTTP layer only sees this trait so the
/// service can run against Postgres or the in-process store.
#[async_trait]
pub trait BotStore: Send + Sync {
    async fn create(&self, bot: &Bot) -> Result<Bot, DatabaseError>;

    /// Returns `None` when no bot has `bot.id`.
    async fn update(&self, bot: &Bot) -> Result<Option<Bot>, DatabaseError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Bot>, DatabaseError>;

    /// Active bots, newest first.
    async fn list_active(&self) -> Result<Vec<Bot>, DatabaseError>;

    /// Every bot regardless of status, newest first.
    async fn get_all(&self) -> Result<Vec<Bot>, DatabaseError>;

    async fn delete(&self, id: &str) -> Result<bool, DatabaseError>;
}
