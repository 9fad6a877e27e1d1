//! VK long-poll session.
//!
//! A session is a `(server, key, ts)` triple from `messages.getLongPollServer`.
//! Each poll holds the connection for up to [`LONG_POLL_WAIT_SECS`] and
//! returns the updates since `ts` together with the next `ts`, which is
//! adopted unconditionally. A failed request leaves the cursor untouched so
//! the next poll repeats it.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::common::error::{VkError, VkResult};
use crate::vk::api::VkClient;
use crate::vk::types::LongPollServer;

/// Server-side wait per long-poll request.
pub const LONG_POLL_WAIT_SECS: u64 = 25;

/// Position in the long-poll event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongPollCursor {
    pub server: String,
    pub key: String,
    pub ts: u64,
}

impl From<LongPollServer> for LongPollCursor {
    fn from(server: LongPollServer) -> Self {
        Self {
            server: server.server,
            key: server.key,
            ts: server.ts,
        }
    }
}

/// Parsed long-poll response body.
#[derive(Debug, Clone, PartialEq)]
enum PollResponse {
    Updates { ts: u64, updates: Vec<Value> },
    /// `failed` answer; `ts` is only present for code 1.
    Failed { code: i64, ts: Option<u64> },
}

/// An open long-poll session owned by the VK -> Telegram task.
pub struct LongPoll {
    api: VkClient,
    cursor: LongPollCursor,
}

impl LongPoll {
    /// Acquire a session. Failure here means nothing can be bridged.
    pub async fn open(api: VkClient) -> VkResult<Self> {
        let cursor = LongPollCursor::from(api.get_long_poll_server().await?);
        info!(server = %cursor.server, ts = cursor.ts, "Long-poll session opened");
        Ok(Self { api, cursor })
    }

    pub fn cursor(&self) -> &LongPollCursor {
        &self.cursor
    }

    /// Issue one long-poll request and return the raw updates.
    ///
    /// On success the cursor advances to the returned `ts`. On any error the
    /// cursor is left as it was. Invalidated sessions are re-acquired here
    /// and yield an empty batch.
    pub async fn poll(&mut self) -> VkResult<Vec<Value>> {
        let body = self
            .api
            .long_poll_check(
                &self.cursor.server,
                &self.cursor.key,
                self.cursor.ts,
                LONG_POLL_WAIT_SECS,
            )
            .await?;

        match parse_poll_response(&body)? {
            PollResponse::Updates { ts, updates } => {
                debug!(ts, count = updates.len(), "Long-poll batch");
                self.cursor.ts = ts;
                Ok(updates)
            }
            PollResponse::Failed { code: 1, ts } => {
                warn!(old_ts = self.cursor.ts, new_ts = ?ts, "Long-poll history outdated");
                if let Some(ts) = ts {
                    self.cursor.ts = ts;
                }
                Ok(Vec::new())
            }
            PollResponse::Failed { code: 2, .. } => {
                info!("Long-poll key expired, requesting a new one");
                let server = self.api.get_long_poll_server().await?;
                self.cursor.server = server.server;
                self.cursor.key = server.key;
                Ok(Vec::new())
            }
            PollResponse::Failed { code, .. } => {
                info!(code, "Long-poll session lost, resubscribing");
                self.cursor = LongPollCursor::from(self.api.get_long_poll_server().await?);
                Ok(Vec::new())
            }
        }
    }
}

fn parse_poll_response(body: &str) -> VkResult<PollResponse> {
    const CONTEXT: &str = "long-poll server";

    let value: Value = serde_json::from_str(body).map_err(|e| VkError::malformed(CONTEXT, e))?;
    let ts = value.get("ts").and_then(parse_ts);

    if let Some(code) = value.get("failed").and_then(Value::as_i64) {
        return Ok(PollResponse::Failed { code, ts });
    }

    let ts = ts.ok_or_else(|| VkError::malformed(CONTEXT, "missing 'ts'"))?;
    let updates = match value.get("updates") {
        Some(Value::Array(updates)) => updates.clone(),
        Some(_) => return Err(VkError::malformed(CONTEXT, "'updates' is not an array")),
        None => Vec::new(),
    };

    Ok(PollResponse::Updates { ts, updates })
}

fn parse_ts(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
