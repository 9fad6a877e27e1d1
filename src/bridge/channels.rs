//! Bridge channel management.
//!
//! Provides the communication channels between the Telegram listener and
//! the forwarding tasks, plus the shared shutdown signal.

use tokio::sync::{mpsc, watch};

use crate::common::TelegramMessage;

/// Channels for the Telegram listener.
pub struct TelegramSideChannels {
    /// Sender for inbound Telegram messages.
    pub inbound_tx: mpsc::UnboundedSender<TelegramMessage>,
    /// Receiver for the shutdown signal.
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Channels for the forwarding tasks.
pub struct BridgeSideChannels {
    /// Receiver for inbound Telegram messages (Telegram -> VK task listens).
    pub telegram_rx: mpsc::UnboundedReceiver<TelegramMessage>,
    /// Receiver for the shutdown signal; clone one per task.
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Control channels for shutdown coordination.
pub struct ControlChannels {
    /// Sender to trigger shutdown.
    pub shutdown_tx: watch::Sender<bool>,
}

/// Bundle of all channels created at startup.
pub struct ChannelBundle {
    pub telegram: TelegramSideChannels,
    pub bridge: BridgeSideChannels,
    pub control: ControlChannels,
}

impl ChannelBundle {
    pub fn new() -> Self {
        let (inbound_tx, telegram_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            telegram: TelegramSideChannels {
                inbound_tx,
                shutdown_rx: shutdown_rx.clone(),
            },
            bridge: BridgeSideChannels {
                telegram_rx,
                shutdown_rx,
            },
            control: ControlChannels { shutdown_tx },
        }
    }
}

impl Default for ChannelBundle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once shutdown has been signalled or the sender is gone.
pub async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}
