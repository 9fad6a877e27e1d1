//! Attachment resolution.
//!
//! A long-poll message only carries `attachN = "<owner>_<id>"` pairs. Turning
//! a photo reference into a URL Telegram can fetch takes two API calls:
//! `messages.getById` for the photo's access key, then `photos.getById` for
//! the size variants, of which the last (largest) one is used.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::common::error::{VkError, VkResult};
use crate::common::ResolvedMedia;
use crate::vk::api::VkClient;
use crate::vk::types::{PhotoSize, VkMessage};

/// Attachment type that is forwarded.
const PHOTO_TYPE: &str = "photo";

/// The `attachN` / `attachN_type` map from a long-poll update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentMap(Map<String, Value>);

impl AttachmentMap {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Whether the message carries at least one attachment.
    pub fn has_attachments(&self) -> bool {
        self.0.contains_key("attach1")
    }

    /// Number of attachments; each one contributes exactly two keys.
    pub fn count(&self) -> usize {
        if self.has_attachments() {
            self.0.len() / 2
        } else {
            0
        }
    }

    /// Attachment references in order, skipping entries with no media ID.
    pub fn refs(&self) -> Vec<AttachmentRef> {
        (1..=self.count())
            .filter_map(|n| {
                let media_id = self.0.get(&format!("attach{}", n))?.as_str()?;
                let kind = self
                    .0
                    .get(&format!("attach{}_type", n))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Some(AttachmentRef {
                    index: n,
                    media_id: media_id.to_string(),
                    kind: kind.to_string(),
                })
            })
            .collect()
    }
}

/// One attachment of a long-poll message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// 1-based position within the message.
    pub index: usize,
    /// `<owner>_<id>` reference.
    pub media_id: String,
    /// Attachment type (`photo`, `video`, `doc`, ...).
    pub kind: String,
}

impl AttachmentRef {
    pub fn is_photo(&self) -> bool {
        self.kind == PHOTO_TYPE
    }
}

/// URL of the largest size variant. Sizes are ordered ascending.
pub fn best_size_url(sizes: &[PhotoSize]) -> Option<&str> {
    sizes.last().map(|s| s.src.as_str())
}

/// Resolves photo attachments to fetchable URLs.
#[derive(Clone)]
pub struct AttachmentResolver {
    api: VkClient,
}

impl AttachmentResolver {
    pub fn new(api: VkClient) -> Self {
        Self { api }
    }

    /// Resolve every photo attachment of a message.
    ///
    /// Non-photo attachments are skipped. A photo whose lookups fail is
    /// logged and dropped; the rest of the message is unaffected.
    pub async fn resolve(&self, message_id: i64, attachments: &AttachmentMap) -> Vec<ResolvedMedia> {
        let mut resolved = Vec::new();
        // Fetched on the first photo, shared by the rest
        let mut full_message: Option<VkMessage> = None;

        for attachment in attachments.refs() {
            if !attachment.is_photo() {
                debug!(
                    message_id,
                    index = attachment.index,
                    kind = %attachment.kind,
                    "Skipping non-photo attachment"
                );
                continue;
            }

            match self
                .resolve_photo(message_id, &attachment, &mut full_message)
                .await
            {
                Ok(media) => resolved.push(media),
                Err(e) => warn!(
                    message_id,
                    index = attachment.index,
                    media_id = %attachment.media_id,
                    "Dropping photo attachment: {}",
                    e
                ),
            }
        }

        resolved
    }

    async fn resolve_photo(
        &self,
        message_id: i64,
        attachment: &AttachmentRef,
        full_message: &mut Option<VkMessage>,
    ) -> VkResult<ResolvedMedia> {
        if full_message.is_none() {
            *full_message = Some(self.fetch_message(message_id).await?);
        }

        let access_key = full_message
            .as_ref()
            .and_then(|m| m.attachments.get(attachment.index - 1))
            .filter(|a| a.kind == PHOTO_TYPE)
            .and_then(|a| a.photo.as_ref())
            .and_then(|p| p.access_key.as_deref())
            .filter(|key| !key.is_empty());

        let photo_ref = match access_key {
            Some(key) => format!("{}_{}", attachment.media_id, key),
            None => {
                debug!(message_id, index = attachment.index, "Photo has no access key");
                attachment.media_id.clone()
            }
        };

        let photos = self.api.photos_get_by_id(&photo_ref).await?;
        let url = photos
            .first()
            .and_then(|photo| best_size_url(&photo.sizes))
            .ok_or_else(|| VkError::empty("photos.getById"))?;

        Ok(ResolvedMedia {
            url: url.to_string(),
        })
    }

    async fn fetch_message(&self, message_id: i64) -> VkResult<VkMessage> {
        self.api
            .messages_get_by_id(message_id)
            .await?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| VkError::empty("messages.getById"))
    }
}
