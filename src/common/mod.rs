//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;

// Re-export message types from messages module
pub use messages::{ResolvedMedia, TelegramMessage, UserName};
