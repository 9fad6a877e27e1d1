//! Bridge state management.
//!
//! Provides state types for the bridge initialization lifecycle:
//! - `PendingBridgeState`: addressing derived from configuration
//! - `BridgeState`: fully resolved state, immutable after creation
//!
//! The initialization flow is:
//! 1. Create `PendingBridgeState` from the loaded config
//! 2. Look up the VK token owner's user ID
//! 3. Build `BridgeState` and hand it to the forwarding tasks

use crate::config::types::Config;

/// Addressing known from configuration alone.
#[derive(Debug, Clone)]
pub struct PendingBridgeState {
    pub telegram_chat_id: i64,
    pub vk_peer_id: i64,
}

impl PendingBridgeState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            telegram_chat_id: config.telegram.chat_id,
            vk_peer_id: config.vk.peer_id(),
        }
    }

    /// Complete the state with the bridge's own VK user ID.
    pub fn resolve(self, vk_self_id: i64) -> BridgeState {
        tracing::info!(
            telegram_chat_id = self.telegram_chat_id,
            vk_peer_id = self.vk_peer_id,
            vk_self_id,
            "Bridge state resolved"
        );

        BridgeState {
            telegram_chat_id: self.telegram_chat_id,
            vk_peer_id: self.vk_peer_id,
            vk_self_id: vk_self_id.to_string(),
        }
    }
}

/// Immutable addressing shared by both forwarding directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeState {
    /// Telegram chat on the Telegram side.
    pub telegram_chat_id: i64,
    /// VK peer ID of the bridged chat.
    pub vk_peer_id: i64,
    /// The bridge's own VK user ID, as it appears in long-poll `from` fields.
    pub vk_self_id: String,
}
