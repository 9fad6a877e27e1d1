//! Message filtering.
//!
//! Decides which messages cross the bridge: VK messages must target the
//! bridged peer and must not be the bridge's own (echo suppression);
//! Telegram messages must come from the bridged chat.

use crate::bridge::state::BridgeState;
use crate::common::TelegramMessage;
use crate::vk::NewMessage;

/// Why a message was not forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// VK message for a different conversation.
    OtherPeer { peer_id: i64 },
    /// VK message authored by the bridge itself.
    OwnMessage,
    /// Telegram message from a different chat.
    OtherChat { chat_id: i64 },
}

/// Message filter built from the resolved bridge state.
#[derive(Debug, Clone)]
pub struct MessageFilter {
    telegram_chat_id: i64,
    vk_peer_id: i64,
    vk_self_id: String,
}

impl MessageFilter {
    pub fn new(state: &BridgeState) -> Self {
        Self {
            telegram_chat_id: state.telegram_chat_id,
            vk_peer_id: state.vk_peer_id,
            vk_self_id: state.vk_self_id.clone(),
        }
    }

    /// Check a decoded VK message (VK -> Telegram).
    pub fn check_vk(&self, message: &NewMessage) -> Result<(), Rejection> {
        if message.peer_id != self.vk_peer_id {
            return Err(Rejection::OtherPeer {
                peer_id: message.peer_id,
            });
        }
        if message.sender_id == self.vk_self_id {
            return Err(Rejection::OwnMessage);
        }
        Ok(())
    }

    /// Check an inbound Telegram message (Telegram -> VK).
    pub fn check_telegram(&self, message: &TelegramMessage) -> Result<(), Rejection> {
        if message.chat_id != self.telegram_chat_id {
            return Err(Rejection::OtherChat {
                chat_id: message.chat_id,
            });
        }
        Ok(())
    }
}
