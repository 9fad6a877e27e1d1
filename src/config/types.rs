//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "Telegram")]
    pub telegram: TelegramConfig,
    #[serde(rename = "Vkontakte")]
    pub vk: VkConfig,
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(rename = "Token")]
    pub token: String,
    /// Telegram chat whose messages are mirrored and which receives VK messages.
    #[serde(rename = "ChatID")]
    pub chat_id: i64,
}

/// VK configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VkConfig {
    #[serde(rename = "Token")]
    pub token: String,
    /// VK chat number (not the peer ID, see `VkConfig::peer_id`).
    #[serde(rename = "ChatID")]
    pub chat_id: i64,
}

/// VK peer IDs for multi-user chats live above this offset.
pub const VK_CHAT_PEER_OFFSET: i64 = 2_000_000_000;

impl VkConfig {
    /// Peer ID addressing the configured chat.
    pub fn peer_id(&self) -> i64 {
        self.chat_id + VK_CHAT_PEER_OFFSET
    }
}
