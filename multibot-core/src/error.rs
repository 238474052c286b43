//! Error types for the Multibot core library.
//!
//! Service-side operations (bot storage, chat completion, configuration)
//! report through [`MultibotError`]. The widget controller and the embedded
//! frame keep their own error enums in their modules because they never
//! propagate failures to the host page; those errors are logged and dropped.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Database | Connection, query and migration errors |
//! | E2001-E2099 | Config | Config file and validation errors |
//! | E3001-E3099 | Bot | Bot lookup, activation and validation errors |
//! | E4001-E4099 | Chat | Chat request validation errors |
//! | E5001-E5099 | Completion API | Upstream language-model API errors |
//! | E6001-E6099 | Widget | See `widget::WidgetError` |
//! | E7001-E7099 | Frame | See `frame::FrameError` |
//! | E9001-E9099 | General | Internal, IO, serialization and validation errors |

use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// The main error type for the Multibot service.
#[derive(Debug, Error)]
pub enum MultibotError {
    // ========================================================================
    // Database Errors (E1001-E1099)
    // ========================================================================
    /// Failed to establish database connection
    #[error("[E1001] Database connection failed: {message}")]
    DatabaseConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database query execution failed
    #[error("[E1002] Database query failed: {0}")]
    DatabaseQueryFailed(String),

    /// Database migration failed
    #[error("[E1003] Database migration failed: {0}")]
    DatabaseMigrationFailed(String),

    /// Database pool exhausted or unavailable
    #[error("[E1004] Database pool unavailable: {0}")]
    DatabasePoolUnavailable(String),

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E2003] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E2004] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // Bot Errors (E3001-E3099)
    // ========================================================================
    /// No bot with this id exists
    #[error("[E3001] Bot not found: {0}")]
    BotNotFound(String),

    /// Bot exists but has been deactivated
    #[error("[E3002] Bot is not active: {0}")]
    BotInactive(String),

    /// Bot payload is missing required fields
    #[error("[E3003] Invalid bot: {0}")]
    InvalidBot(String),

    // ========================================================================
    // Chat Errors (E4001-E4099)
    // ========================================================================
    /// Chat request carried no message text
    #[error("[E4001] Message is required")]
    EmptyMessage,

    // ========================================================================
    // Completion API Errors (E5001-E5099)
    // ========================================================================
    /// API request failed
    #[error("[E5001] API request failed: {0}")]
    ApiRequestFailed(String),

    /// API response parse error
    #[error("[E5002] Failed to parse API response: {0}")]
    ApiParseError(String),

    /// API rate limit exceeded
    #[error(
        "[E5003] API rate limit exceeded for {service}, retry after {retry_after_secs} seconds"
    )]
    ApiRateLimitExceeded {
        service: String,
        retry_after_secs: u64,
    },

    /// API authentication failed
    #[error("[E5004] API authentication failed for {service}: {message}")]
    ApiAuthenticationFailed { service: String, message: String },

    /// API service unavailable
    #[error("[E5005] API service unavailable: {0}")]
    ApiServiceUnavailable(String),

    /// Completion call timed out
    #[error("[E5006] Completion request timed out after {0} seconds")]
    ApiTimeout(u64),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// Validation error
    #[error("[E9002] Validation error: {0}")]
    ValidationError(String),

    /// IO error
    #[error("[E9003] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9004] Serialization error: {0}")]
    SerializationError(String),
}

impl MultibotError {
    /// Create a database connection error from a string message.
    pub fn database_connection_failed(message: impl Into<String>) -> Self {
        MultibotError::DatabaseConnectionFailed {
            message: message.into(),
            source: None,
        }
    }
}

/// Result type alias for Multibot operations.
pub type MultibotResult<T> = Result<T, MultibotError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<sqlx::Error> for MultibotError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut => MultibotError::DatabasePoolUnavailable(err.to_string()),
            sqlx::Error::PoolClosed => {
                MultibotError::DatabasePoolUnavailable("Connection pool is closed".to_string())
            }
            sqlx::Error::Configuration(_) => {
                MultibotError::database_connection_failed(err.to_string())
            }
            sqlx::Error::Database(db_err) => {
                MultibotError::DatabaseQueryFailed(db_err.to_string())
            }
            _ => MultibotError::DatabaseQueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for MultibotError {
    fn from(err: reqwest::Error) -> Self {
        let service = || {
            err.url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string())
        };

        if err.is_timeout() {
            MultibotError::ApiTimeout(30)
        } else if err.is_connect() {
            MultibotError::ApiServiceUnavailable(err.to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                429 => MultibotError::ApiRateLimitExceeded {
                    service: service(),
                    retry_after_secs: 60,
                },
                401 | 403 => MultibotError::ApiAuthenticationFailed {
                    service: service(),
                    message: status.to_string(),
                },
                _ => MultibotError::ApiRequestFailed(err.to_string()),
            }
        } else if err.is_decode() {
            MultibotError::ApiParseError(err.to_string())
        } else {
            MultibotError::ApiRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MultibotError {
    fn from(err: serde_json::Error) -> Self {
        MultibotError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for MultibotError {
    fn from(err: std::io::Error) -> Self {
        MultibotError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for MultibotError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => MultibotError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => MultibotError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            _ => MultibotError::ConfigParseError(err.to_string()),
        }
    }
}

impl From<crate::db::DatabaseError> for MultibotError {
    fn from(err: crate::db::DatabaseError) -> Self {
        match err {
            crate::db::DatabaseError::Unavailable(msg) => MultibotError::DatabasePoolUnavailable(msg),
            crate::db::DatabaseError::Sqlx(e) => MultibotError::from(e),
            crate::db::DatabaseError::MigrationFailed(e) => {
                MultibotError::DatabaseMigrationFailed(e.to_string())
            }
            crate::db::DatabaseError::InvalidConfig(msg) => MultibotError::InvalidConfigValue {
                key: "database".to_string(),
                message: msg,
            },
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl MultibotError {
    /// Returns true if this error is transient and the operation might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MultibotError::DatabasePoolUnavailable(_)
                | MultibotError::DatabaseConnectionFailed { .. }
                | MultibotError::ApiRateLimitExceeded { .. }
                | MultibotError::ApiServiceUnavailable(_)
                | MultibotError::ApiTimeout(_)
        )
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            MultibotError::DatabaseConnectionFailed { .. } => "E1001",
            MultibotError::DatabaseQueryFailed(_) => "E1002",
            MultibotError::DatabaseMigrationFailed(_) => "E1003",
            MultibotError::DatabasePoolUnavailable(_) => "E1004",
            MultibotError::ConfigParseError(_) => "E2003",
            MultibotError::InvalidConfigValue { .. } => "E2004",
            MultibotError::BotNotFound(_) => "E3001",
            MultibotError::BotInactive(_) => "E3002",
            MultibotError::InvalidBot(_) => "E3003",
            MultibotError::EmptyMessage => "E4001",
            MultibotError::ApiRequestFailed(_) => "E5001",
            MultibotError::ApiParseError(_) => "E5002",
            MultibotError::ApiRateLimitExceeded { .. } => "E5003",
            MultibotError::ApiAuthenticationFailed { .. } => "E5004",
            MultibotError::ApiServiceUnavailable(_) => "E5005",
            MultibotError::ApiTimeout(_) => "E5006",
            MultibotError::Internal(_) => "E9001",
            MultibotError::ValidationError(_) => "E9002",
            MultibotError::IoError(_) => "E9003",
            MultibotError::SerializationError(_) => "E9004",
        }
    }

    /// HTTP status the API answers with when this error reaches a handler.
    /// Anything below 500 is the caller's fault and safe to echo back.
    pub fn status_code(&self) -> u16 {
        match self {
            MultibotError::BotNotFound(_) => 404,
            MultibotError::BotInactive(_)
            | MultibotError::InvalidBot(_)
            | MultibotError::EmptyMessage
            | MultibotError::ValidationError(_) => 400,
            MultibotError::ApiRateLimitExceeded { .. } => 429,
            MultibotError::ApiServiceUnavailable(_) | MultibotError::DatabasePoolUnavailable(_) => {
                503
            }
            MultibotError::ApiTimeout(_) => 504,
            _ => 500,
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            MultibotError::DatabaseConnectionFailed { .. } => {
                Some("Check that PostgreSQL is running and DATABASE_URL is correct")
            }
            MultibotError::DatabasePoolUnavailable(_) => {
                Some("The database is busy. Try again in a few seconds")
            }
            MultibotError::BotNotFound(_) => Some("Run 'multibot bots list' to see bot ids"),
            MultibotError::BotInactive(_) => {
                Some("Re-activate the bot with 'multibot bots update <id> --activate'")
            }
            MultibotError::ApiRateLimitExceeded { .. } => {
                Some("Wait for the rate limit to reset or use a different API key")
            }
            MultibotError::ApiAuthenticationFailed { .. } => {
                Some("Check OPENAI_API_KEY in your environment or configuration")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with suggestions.
pub struct CliErrorDisplay<'a> {
    error: &'a MultibotError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a MultibotError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        if self.error.is_transient() {
            writeln!(f)?;
            writeln!(f, "  This error may be temporary. Try again shortly.")?;
        }

        Ok(())
    }
}
