//! Telegram (push-based) side of the bridge.
//!
//! The bridge sees Telegram as two capabilities: an inbound stream of user
//! messages (fed by the dispatcher in `handler`) and the outbound
//! [`TelegramSender`] implemented by `client::TelegramClient`.

pub mod client;
pub mod handler;

use async_trait::async_trait;

use crate::common::error::TelegramResult;

pub use client::TelegramClient;

/// Outbound Telegram operations used by the VK -> Telegram direction.
#[async_trait]
pub trait TelegramSender: Send + Sync {
    /// Send a MarkdownV2-formatted text message.
    async fn send_text(&self, chat_id: i64, text: &str) -> TelegramResult<()>;

    /// Send a photo Telegram fetches from `url`, with a MarkdownV2 caption.
    async fn send_photo(&self, chat_id: i64, url: &str, caption: &str) -> TelegramResult<()>;
}
