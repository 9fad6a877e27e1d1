//! Telegram inbound message handling.
//!
//! Runs a teloxide dispatcher that reduces every user message to a
//! [`TelegramMessage`] and pushes it onto the bridge's inbound channel.
//! Chat filtering happens in the bridge, not here.

use teloxide::prelude::*;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::bridge::channels::wait_for_shutdown;
use crate::common::TelegramMessage;

/// Run the dispatcher until shutdown is signalled.
pub async fn run_listener(
    bot: Bot,
    inbound_tx: mpsc::UnboundedSender<TelegramMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!("Starting Telegram listener...");

    let handler = Update::filter_message().endpoint(handle_message);

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![inbound_tx])
        .default_handler(|upd| async move {
            debug!("Unhandled Telegram update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build();

    let shutdown_token = dispatcher.shutdown_token();
    let watcher = tokio::spawn(async move {
        wait_for_shutdown(&mut shutdown_rx).await;
        info!("Stopping Telegram listener...");
        match shutdown_token.shutdown() {
            Ok(stopped) => stopped.await,
            Err(e) => warn!("Telegram dispatcher was not running: {}", e),
        }
    });

    dispatcher.dispatch().await;
    watcher.abort();

    info!("Telegram listener ended");
}

async fn handle_message(
    msg: Message,
    inbound_tx: mpsc::UnboundedSender<TelegramMessage>,
) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let Some(text) = msg.text().or_else(|| msg.caption()) else {
        debug!(chat_id = msg.chat.id.0, "Ignoring Telegram message without text");
        return Ok(());
    };

    let incoming = TelegramMessage {
        chat_id: msg.chat.id.0,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        text: text.to_string(),
    };

    if let Err(e) = inbound_tx.send(incoming) {
        warn!("Failed to queue Telegram message: {}", e);
    }

    Ok(())
}
