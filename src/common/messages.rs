//! Canonical message types for bridge communication.
//!
//! This module defines the single source of truth for message types
//! passed between the Telegram side and the VK side.

/// Message received from Telegram, already reduced to what the bridge relays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramMessage {
    /// Telegram chat the message was posted in.
    pub chat_id: i64,
    /// Sender's first name.
    pub first_name: String,
    /// Sender's last name, if the account has one.
    pub last_name: Option<String>,
    /// Message text (or photo/document caption).
    pub text: String,
}

impl TelegramMessage {
    /// Sender's display name, "First Last" or just "First".
    pub fn sender_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Display name of a VK user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName {
    pub first_name: String,
    pub last_name: String,
}

impl UserName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last", trimmed when either half is empty.
    pub fn full(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Photo resolved to a fetchable URL, ready to be sent to Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// URL of the largest available size variant.
    pub url: String,
}
