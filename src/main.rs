//! MessagePipe - Telegram-VK chat bridge
//!
//! Relays messages between one Telegram group chat and one VK multi-user
//! chat. Telegram updates are pushed to a bot dispatcher; VK updates are
//! pulled through a long-poll session.

mod bridge;
mod common;
mod config;
mod telegram;
mod vk;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use bridge::{Bridge, BridgeState, ChannelBundle, PendingBridgeState};
use common::error::AppError;
use config::types::Config;
use config::{env::get_config_path, load_and_validate};
use telegram::TelegramClient;
use vk::identity::current_user_id;
use vk::{IdentityCache, LongPoll, ReqwestTransport, VkClient};

/// Everything that has to succeed before forwarding starts.
struct Connected {
    state: BridgeState,
    vk: VkClient,
    telegram: TelegramClient,
    long_poll: LongPoll,
}

async fn connect(config: &Config) -> Result<Connected, AppError> {
    let pending = PendingBridgeState::from_config(config);

    let transport = Arc::new(ReqwestTransport::new()?);
    let vk = VkClient::new(transport, config.vk.token.clone());

    info!("Looking up VK account...");
    let vk_self_id = current_user_id(&vk).await?;
    let state = pending.resolve(vk_self_id);

    info!("Connecting to Telegram...");
    let telegram = TelegramClient::connect(&config.telegram.token).await?;

    info!("Opening VK long-poll session...");
    let long_poll = LongPoll::open(vk.clone()).await?;

    Ok(Connected {
        state,
        vk,
        telegram,
        long_poll,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("MessagePipe v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        AppError::from(e)
    })?;

    info!("Configuration loaded successfully");
    info!("  Telegram chat: {}", config.telegram.chat_id);
    info!("  VK chat: {} (peer {})", config.vk.chat_id, config.vk.peer_id());

    let Connected {
        state,
        vk,
        telegram,
        long_poll,
    } = connect(&config).await.map_err(|e| {
        error!("Startup failed: {}", e);
        e
    })?;

    // ============================================================
    // Create channels and the bridge
    // ============================================================
    let channels = ChannelBundle::new();

    let identities = Arc::new(IdentityCache::new(vk.clone()));
    let bridge = Arc::new(Bridge::new(
        state,
        vk,
        identities,
        Arc::new(telegram.clone()),
    ));

    // ============================================================
    // Spawn tasks
    // ============================================================
    let shutdown_rx = channels.bridge.shutdown_rx;

    let listener_task = tokio::spawn(telegram::handler::run_listener(
        telegram.bot(),
        channels.telegram.inbound_tx,
        channels.telegram.shutdown_rx,
    ));

    let mut telegram_to_vk = tokio::spawn(
        bridge
            .clone()
            .run_telegram_to_vk(channels.bridge.telegram_rx, shutdown_rx.clone()),
    );

    let mut vk_to_telegram = tokio::spawn(bridge.run_vk_to_telegram(long_poll, shutdown_rx));

    info!("Bridge running");

    // ============================================================
    // Run until a signal arrives or a forwarding task stops
    // ============================================================
    let shutdown_tx = channels.control.shutdown_tx;

    tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping bridge...");
        }
        result = &mut telegram_to_vk => match result {
            Ok(()) => warn!("Telegram -> VK task ended unexpectedly"),
            Err(e) => error!("Telegram -> VK task panicked: {}", e),
        },
        result = &mut vk_to_telegram => match result {
            Ok(()) => warn!("VK -> Telegram task ended unexpectedly"),
            Err(e) => error!("VK -> Telegram task panicked: {}", e),
        },
    }

    if let Err(e) = shutdown_tx.send(true) {
        debug!("Shutdown channel closed (all tasks already exited): {}", e);
    }

    let all_tasks = async {
        join_task("Telegram listener", listener_task).await;
        // A forwarding task that already ended was reported by the select above
        if !telegram_to_vk.is_finished() {
            join_task("Telegram -> VK", telegram_to_vk).await;
        }
        if !vk_to_telegram.is_finished() {
            join_task("VK -> Telegram", vk_to_telegram).await;
        }
    };

    match tokio::time::timeout(Duration::from_secs(5), all_tasks).await {
        Ok(()) => info!("All tasks stopped"),
        Err(_) => warn!("Shutdown timed out"),
    }

    info!("Exiting...");
    Ok(())
}

/// Await a task during shutdown. Returns `false` if it panicked.
async fn join_task(name: &str, task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => {
            debug!("{} task stopped", name);
            true
        }
        Err(e) => {
            warn!("{} task panicked: {}", name, e);
            false
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
