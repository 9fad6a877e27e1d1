//! VK (pull-based) side of the bridge.
//!
//! - `api`: method API client and the HTTP transport seam
//! - `longpoll`: long-poll session and cursor
//! - `decoder`: positional update record decoding
//! - `attachments`: photo attachment resolution
//! - `identity`: user display-name cache

pub mod api;
pub mod attachments;
pub mod decoder;
pub mod identity;
pub mod longpoll;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use api::{ReqwestTransport, VkClient};
pub use attachments::AttachmentResolver;
pub use decoder::{decode, InboundEvent, NewMessage};
pub use identity::IdentityCache;
pub use longpoll::LongPoll;
