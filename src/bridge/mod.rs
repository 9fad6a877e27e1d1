//! Bridge between the Telegram chat and the VK chat.
//!
//! ## Module Structure
//!
//! - `channels`: Communication channel structures and the shutdown signal
//! - `filter`: Which messages cross the bridge
//! - `formatter`: Sender headers and bodies for each direction
//! - `orchestrator`: Forwarding loops (`Bridge` struct)
//! - `state`: Resolved addressing (`BridgeState`)

pub mod channels;
pub mod filter;
pub mod formatter;
pub mod orchestrator;
pub mod state;

pub use channels::ChannelBundle;
pub use orchestrator::Bridge;
pub use state::{BridgeState, PendingBridgeState};
