//! VK API response shapes.
//!
//! Only the fields the bridge reads are modelled; everything else in the
//! payloads is ignored by serde.

use serde::{Deserialize, Deserializer};

/// Entry of a `users.get` response.
#[derive(Debug, Clone, Deserialize)]
pub struct VkUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// `messages.getLongPollServer` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LongPollServer {
    pub key: String,
    pub server: String,
    #[serde(deserialize_with = "flexible_u64")]
    pub ts: u64,
}

/// `messages.getById` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesById {
    #[serde(default)]
    pub items: Vec<VkMessage>,
}

/// A full message as returned by `messages.getById`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkMessage {
    #[serde(default)]
    pub attachments: Vec<VkAttachment>,
}

/// One attachment of a full message.
#[derive(Debug, Clone, Deserialize)]
pub struct VkAttachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub photo: Option<VkPhotoKey>,
}

/// The part of a photo object that carries its access key.
#[derive(Debug, Clone, Deserialize)]
pub struct VkPhotoKey {
    pub access_key: Option<String>,
}

/// Entry of a `photos.getById` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkPhoto {
    #[serde(default)]
    pub sizes: Vec<PhotoSize>,
}

/// A single size variant of a photo. Newer API versions name the field `url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoSize {
    #[serde(alias = "url")]
    pub src: String,
}

/// Long-poll timestamps arrive as numbers or numeric strings depending on version.
pub(crate) fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
