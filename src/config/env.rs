//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `MESSAGEPIPE_CONFIG` - Path to the config file
//! - `MESSAGEPIPE_TELEGRAM_TOKEN` - Telegram bot token
//! - `MESSAGEPIPE_VK_TOKEN` - VK access token

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "MESSAGEPIPE";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_TELEGRAM_TOKEN", ENV_PREFIX)) {
        if !token.is_empty() {
            config.telegram.token = token;
        }
    }

    if let Ok(token) = env::var(format!("{}_VK_TOKEN", ENV_PREFIX)) {
        if !token.is_empty() {
            config.vk.token = token;
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `MESSAGEPIPE_CONFIG` environment variable, otherwise returns "config.json".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "config.json".to_string())
}
