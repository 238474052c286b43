//! PostgreSQL pool and migrations for the `bots` table.

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseSettings;
use crate::repo::BotRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Pool parameters. Built from [`DatabaseSettings`] by the config layer.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.url.is_empty() {
            return Err(DatabaseError::InvalidConfig("url is empty".to_string()));
        }
        if self.min_connections > self.max_connections {
            return Err(DatabaseError::InvalidConfig(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            url: settings.url.clone(),
            max_connections: settings.pool_max_connections,
            min_connections: settings.pool_min_connections,
            acquire_timeout: Duration::from_secs(settings.pool_acquire_timeout_secs),
            idle_timeout: Duration::from_secs(settings.pool_idle_timeout_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    #[error("Invalid database configuration: {0}")]
    InvalidConfig(String),

    #[error("Bot store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        config.validate()?;
        info!(
            max_connections = config.max_connections,
            "Connecting to bot database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect(&config.url)
            .await?;

        debug!("Database pool ready");
        Ok(Self { pool })
    }

    /// Connect from loaded settings, optionally bringing the schema up to date.
    pub async fn open(settings: &DatabaseSettings, migrate: bool) -> Result<Self, DatabaseError> {
        let db = Self::connect(&DatabaseConfig::from(settings)).await?;
        if migrate {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        info!("Applying bot schema migrations");
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(DatabaseError::MigrationFailed)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Bot repository sharing this pool.
    pub fn bots(&self) -> BotRepository {
        BotRepository::new(self.pool.clone())
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
