//! Bridge orchestrator that ties Telegram and VK together.
//!
//! Runs the two forwarding directions as independent loops. Each owns its
//! own input (the Telegram inbound channel, the VK long-poll session) and
//! shares only the immutable [`BridgeState`] and the identity cache.
//! Updates are handled strictly one at a time, in arrival order.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::bridge::channels::wait_for_shutdown;
use crate::bridge::filter::MessageFilter;
use crate::bridge::formatter::{format_for_telegram, format_for_vk, telegram_header};
use crate::bridge::state::BridgeState;
use crate::common::TelegramMessage;
use crate::telegram::TelegramSender;
use crate::vk::{decode, AttachmentResolver, IdentityCache, InboundEvent, LongPoll, VkClient};

/// What happened to a single inbound unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sent to the other side.
    Forwarded,
    /// Not meant for the bridge (other chat, own message, other event type).
    Skipped,
    /// Meant for the bridge but dropped after a remote failure.
    Failed,
}

/// The main bridge that orchestrates message flow.
pub struct Bridge {
    state: BridgeState,
    filter: MessageFilter,
    vk: VkClient,
    identities: Arc<IdentityCache>,
    attachments: AttachmentResolver,
    telegram: Arc<dyn TelegramSender>,
}

impl Bridge {
    pub fn new(
        state: BridgeState,
        vk: VkClient,
        identities: Arc<IdentityCache>,
        telegram: Arc<dyn TelegramSender>,
    ) -> Self {
        Self {
            filter: MessageFilter::new(&state),
            attachments: AttachmentResolver::new(vk.clone()),
            state,
            vk,
            identities,
            telegram,
        }
    }

    /// Forward one Telegram message to the VK chat.
    pub async fn handle_telegram_message(&self, message: &TelegramMessage) -> Outcome {
        if let Err(reason) = self.filter.check_telegram(message) {
            debug!(?reason, "Telegram message not forwarded");
            return Outcome::Skipped;
        }

        let body = format_for_vk(message);

        match self.vk.messages_send(self.state.vk_peer_id, &body).await {
            Ok(message_id) => {
                info!(peer_id = self.state.vk_peer_id, message_id, "Telegram -> VK: {}", body);
                Outcome::Forwarded
            }
            Err(e) => {
                warn!(peer_id = self.state.vk_peer_id, "Failed to send message to VK: {}", e);
                Outcome::Failed
            }
        }
    }

    /// Forward one raw long-poll update to the Telegram chat.
    pub async fn handle_vk_update(&self, update: &Value) -> Outcome {
        let InboundEvent::MessageNew(message) = decode(update) else {
            return Outcome::Skipped;
        };

        if let Err(reason) = self.filter.check_vk(&message) {
            debug!(message_id = message.message_id, ?reason, "VK message not forwarded");
            return Outcome::Skipped;
        }

        let name = match self.identities.resolve(&message.sender_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!(message_id = message.message_id, "Dropping VK message: {}", e);
                return Outcome::Failed;
            }
        };

        let chat_id = self.state.telegram_chat_id;

        if message.attachments.has_attachments() {
            let caption = telegram_header(&name);
            let photos = self
                .attachments
                .resolve(message.message_id, &message.attachments)
                .await;

            for photo in &photos {
                if let Err(e) = self.telegram.send_photo(chat_id, &photo.url, &caption).await {
                    warn!(
                        message_id = message.message_id,
                        url = %photo.url,
                        "Failed to send photo to Telegram: {}",
                        e
                    );
                }
            }
        }

        let text = format_for_telegram(&name, &message.text);

        match self.telegram.send_text(chat_id, &text).await {
            Ok(()) => {
                info!(chat_id, message_id = message.message_id, "VK -> Telegram: {}", text);
                Outcome::Forwarded
            }
            Err(e) => {
                warn!(
                    chat_id,
                    message_id = message.message_id,
                    "Failed to send message to Telegram: {}",
                    e
                );
                Outcome::Failed
            }
        }
    }

    /// Telegram -> VK loop. Ends on shutdown or when the listener goes away.
    pub async fn run_telegram_to_vk(
        self: Arc<Self>,
        mut telegram_rx: mpsc::UnboundedReceiver<TelegramMessage>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!("Telegram -> VK forwarding started");

        loop {
            let message = tokio::select! {
                message = telegram_rx.recv() => match message {
                    Some(message) => message,
                    None => {
                        info!("Telegram inbound channel closed");
                        break;
                    }
                },
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
            };

            self.handle_telegram_message(&message).await;
        }

        info!("Telegram -> VK forwarding ended");
    }

    /// VK -> Telegram loop. Polls until shutdown; failed polls are retried
    /// immediately with the unchanged cursor.
    pub async fn run_vk_to_telegram(
        self: Arc<Self>,
        mut long_poll: LongPoll,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!("VK -> Telegram forwarding started");

        loop {
            let batch = tokio::select! {
                batch = long_poll.poll() => batch,
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
            };

            match batch {
                Ok(updates) => {
                    for update in &updates {
                        self.handle_vk_update(update).await;
                    }
                }
                Err(e) => {
                    warn!(ts = long_poll.cursor().ts, "Long-poll request failed: {}", e);
                }
            }
        }

        info!("VK -> Telegram forwarding ended");
    }
}
