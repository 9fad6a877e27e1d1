//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::{Config, VK_CHAT_PEER_OFFSET};

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Telegram
    if config.telegram.token.is_empty() {
        errors.push("Telegram.Token is required".to_string());
    }
    if config.telegram.token == "YOUR_TELEGRAM_TOKEN_HERE" {
        errors.push("Telegram.Token has not been configured (still using placeholder)".to_string());
    }
    if config.telegram.chat_id == 0 {
        errors.push("Telegram.ChatID must be non-zero".to_string());
    }

    // VK
    if config.vk.token.is_empty() {
        errors.push("Vkontakte.Token is required".to_string());
    }
    if config.vk.token == "YOUR_VK_TOKEN_HERE" {
        errors.push("Vkontakte.Token has not been configured (still using placeholder)".to_string());
    }
    if config.vk.chat_id <= 0 {
        errors.push(format!(
            "Vkontakte.ChatID must be positive (got {})",
            config.vk.chat_id
        ));
    }
    if config.vk.chat_id > i64::MAX - VK_CHAT_PEER_OFFSET {
        errors.push(format!(
            "Vkontakte.ChatID {} is out of range",
            config.vk.chat_id
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
