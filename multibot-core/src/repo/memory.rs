use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::db::DatabaseError;
use crate::models::Bot;

use super::BotStore;

/// Process-local bot store used by `multibot serve --memory` and tests.
/// Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryBotStore {
    bots: Arc<RwLock<HashMap<String, Bot>>>,
}

impl MemoryBotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bots(bots: impl IntoIterator<Item = Bot>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.bots.write() {
            map.extend(bots.into_iter().map(|b| (b.id.clone(), b)));
        }
        store
    }

    fn poisoned() -> DatabaseError {
        DatabaseError::Unavailable("in-memory bot store lock poisoned".to_string())
    }

    fn newest_first(mut bots: Vec<Bot>) -> Vec<Bot> {
        bots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bots
    }
}

#[async_trait]
impl BotStore for MemoryBotStore {
    async fn create(&self, bot: &Bot) -> Result<Bot, DatabaseError> {
        let mut bots = self.bots.write().map_err(|_| Self::poisoned())?;
        bots.insert(bot.id.clone(), bot.clone());
        Ok(bot.clone())
    }

    async fn update(&self, bot: &Bot) -> Result<Option<Bot>, DatabaseError> {
        let mut bots = self.bots.write().map_err(|_| Self::poisoned())?;
        match bots.get_mut(&bot.id) {
            Some(existing) => {
                *existing = bot.clone();
                Ok(Some(bot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Bot>, DatabaseError> {
        let bots = self.bots.read().map_err(|_| Self::poisoned())?;
        Ok(bots.get(id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Bot>, DatabaseError> {
        let bots = self.bots.read().map_err(|_| Self::poisoned())?;
        Ok(Self::newest_first(
            bots.values().filter(|b| b.is_active).cloned().collect(),
        ))
    }

    async fn get_all(&self) -> Result<Vec<Bot>, DatabaseError> {
        let bots = self.bots.read().map_err(|_| Self::poisoned())?;
        Ok(Self::newest_first(bots.values().cloned().collect()))
    }

    async fn delete(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut bots = self.bots.write().map_err(|_| Self::poisoned())?;
        Ok(bots.remove(id).is_some())
    }
}
