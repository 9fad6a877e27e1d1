//! Telegram bot client.
//!
//! Wraps a teloxide [`Bot`] behind [`TelegramSender`] so the bridge never
//! depends on teloxide request types.

use async_trait::async_trait;
use teloxide::payloads::{SendMessageSetters, SendPhotoSetters};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::info;

use crate::common::error::{TelegramError, TelegramResult};
use crate::telegram::TelegramSender;

/// Authenticated Telegram bot.
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    /// Create the bot and verify the token with `getMe`.
    pub async fn connect(token: &str) -> TelegramResult<Self> {
        let bot = Bot::new(token);
        let me = bot.get_me().await?;
        info!(
            "Logged in to Telegram as @{} (ID {})",
            me.username(),
            me.id
        );
        Ok(Self { bot })
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }
}

#[async_trait]
impl TelegramSender for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> TelegramResult<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, url: &str, caption: &str) -> TelegramResult<()> {
        let photo_url = reqwest::Url::parse(url).map_err(|e| TelegramError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        self.bot
            .send_photo(ChatId(chat_id), InputFile::url(photo_url))
            .caption(caption)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        Ok(())
    }
}
