use crate::db::DatabaseError;
use crate::models::Bot;
use async_trait::async_trait;
use sqlx::PgPool;

use super::BotStore;

pub struct BotRepository {
    pool: PgPool,
}

impl BotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bots")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[async_trait]
impl BotStore for BotRepository {
    async fn create(&self, bot: &Bot) -> Result<Bot, DatabaseError> {
        let record = sqlx::query_as::<_, Bot>(
            r#"
            INSERT INTO bots (id, name, description, company_name, system_prompt, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, company_name, system_prompt, is_active, created_at, updated_at
            "#,
        )
        .bind(&bot.id)
        .bind(&bot.name)
        .bind(&bot.description)
        .bind(&bot.company_name)
        .bind(&bot.system_prompt)
        .bind(bot.is_active)
        .bind(bot.created_at)
        .bind(bot.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update(&self, bot: &Bot) -> Result<Option<Bot>, DatabaseError> {
        let record = sqlx::query_as::<_, Bot>(
            r#"
            UPDATE bots
            SET name = $2, description = $3, company_name = $4, system_prompt = $5,
                is_active = $6, updated_at = $7
            WHERE id = $1
            RETURNING id, name, description, company_name, system_prompt, is_active, created_at, updated_at
            "#,
        )
        .bind(&bot.id)
        .bind(&bot.name)
        .bind(&bot.description)
        .bind(&bot.company_name)
        .bind(&bot.system_prompt)
        .bind(bot.is_active)
        .bind(bot.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Bot>, DatabaseError> {
        let record = sqlx::query_as::<_, Bot>(
            r#"
            SELECT id, name, description, company_name, system_prompt, is_active, created_at, updated_at
            FROM bots
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_active(&self) -> Result<Vec<Bot>, DatabaseError> {
        let records = sqlx::query_as::<_, Bot>(
            r#"
            SELECT id, name, description, company_name, system_prompt, is_active, created_at, updated_at
            FROM bots
            WHERE is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn get_all(&self) -> Result<Vec<Bot>, DatabaseError> {
        let records = sqlx::query_as::<_, Bot>(
            r#"
            SELECT id, name, description, company_name, system_prompt, is_active, created_at, updated_at
            FROM bots
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM bots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
