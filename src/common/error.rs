//! Error types for the application.

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("VK error: {0}")]
    Vk(#[from] VkError),

    #[error("Identity lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// VK API and long-poll errors.
#[derive(Debug, Error)]
pub enum VkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("VK API error {code} in {method}: {message}")]
    Api {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Malformed response from {context}: {message}")]
    Malformed { context: String, message: String },

    #[error("Empty response from {context}")]
    Empty { context: String },
}

impl VkError {
    pub fn malformed(context: impl Into<String>, message: impl ToString) -> Self {
        VkError::Malformed {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub fn empty(context: impl Into<String>) -> Self {
        VkError::Empty {
            context: context.into(),
        }
    }
}

/// Identity (display name) lookup errors.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup for user '{user_id}' failed: {source}")]
    Remote {
        user_id: String,
        #[source]
        source: VkError,
    },

    #[error("Lookup for user '{user_id}' returned no users")]
    NotFound { user_id: String },
}

/// Telegram-related errors.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    #[error("Invalid photo URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Result type alias for VK operations.
pub type VkResult<T> = std::result::Result<T, VkError>;

/// Result type alias for Telegram operations.
pub type TelegramResult<T> = std::result::Result<T, TelegramError>;
