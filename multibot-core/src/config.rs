use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MultibotConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub completion: CompletionSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin the widget script and embed page are served from. Used when
    /// printing embed snippets.
    #[serde(default = "default_public_origin")]
    pub public_origin: String,

    /// Origins allowed by CORS. Empty means any origin, which the embed
    /// frame needs when bots are embedded on arbitrary customer sites.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_storage")]
    pub storage: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_pool_min")]
    pub pool_min_connections: u32,

    #[serde(default = "default_pool_max")]
    pub pool_max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub pool_acquire_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub pool_idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_storage() -> StorageBackend {
    StorageBackend::Postgres
}

fn default_database_url() -> String {
    "postgres://localhost/multibot_dev".to_string()
}

fn default_pool_min() -> u32 {
    1
}

fn default_pool_max() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_api_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_origin: default_public_origin(),
            cors_origins: Vec::new(),
            storage: default_storage(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_min_connections: default_pool_min(),
            pool_max_connections: default_pool_max(),
            pool_acquire_timeout_secs: default_acquire_timeout(),
            pool_idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl MultibotConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("MULTIBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut multibot_config: MultibotConfig = builder.build()?.try_deserialize()?;
        multibot_config.apply_legacy_env();
        multibot_config.validate()?;

        Ok(multibot_config)
    }

    /// Environment variable names the hosted deployment has always used.
    fn apply_legacy_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.completion.api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("CHAT_MODEL") {
            self.completion.model = model;
        }

        if let Some(tokens) = std::env::var("MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.completion.max_tokens = tokens;
        }

        if let Some(temperature) = std::env::var("TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.completion.temperature = temperature;
        }

        if let Some(port) = std::env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        if let Ok(level) = std::env::var("MULTIBOT_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.storage == StorageBackend::Postgres {
            if self.database.url.is_empty() {
                return Err(ConfigLoadError::MissingRequired("database.url".to_string()));
            }

            if !self.database.url.starts_with("postgres://")
                && !self.database.url.starts_with("postgresql://")
            {
                return Err(ConfigLoadError::InvalidValue {
                    key: "database.url".to_string(),
                    message:
                        "Must be a valid PostgreSQL URL starting with postgres:// or postgresql://"
                            .to_string(),
                });
            }
        }

        if self.database.pool_min_connections > self.database.pool_max_connections {
            return Err(ConfigLoadError::InvalidValue {
                key: "database.pool_min_connections".to_string(),
                message: "Cannot be greater than pool_max_connections".to_string(),
            });
        }

        if url::Url::parse(&self.server.public_origin).is_err() {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.public_origin".to_string(),
                message: format!("'{}' is not an absolute URL", self.server.public_origin),
            });
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigLoadError::InvalidValue {
                key: "completion.temperature".to_string(),
                message: "Must be between 0.0 and 2.0".to_string(),
            });
        }

        if self.completion.max_tokens == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "completion.max_tokens".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("multibot.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    for path in paths {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("multibot"))
}
