//! Message formatting for both directions.

use teloxide::utils::markdown;

use crate::common::{TelegramMessage, UserName};

/// Telegram -> VK body: `"<First> <Last>:\n<Text>"`. VK renders plain text.
pub fn format_for_vk(message: &TelegramMessage) -> String {
    format!("{}:\n{}", message.sender_name(), message.text)
}

/// MarkdownV2 sender header: `"*<First> <Last>*:"`.
pub fn telegram_header(name: &UserName) -> String {
    format!("{}:", markdown::bold(&markdown::escape(&name.full())))
}

/// VK -> Telegram body: the bold sender header, a newline, then the text.
pub fn format_for_telegram(name: &UserName, text: &str) -> String {
    format!("{}\n{}", telegram_header(name), markdown::escape(text))
}
