//! VK method API client.
//!
//! Every call is a GET to `https://api.vk.com/method/<name>` carrying the
//! access token and API version as query parameters. The raw HTTP exchange
//! sits behind [`HttpTransport`] so the rest of the bridge never touches
//! reqwest directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::common::error::{VkError, VkResult};
use crate::vk::types::{LongPollServer, MessagesById, VkPhoto, VkUser};

/// Base URL of the method API.
pub const API_URL: &str = "https://api.vk.com/method/";

/// API version sent with every method call.
pub const API_VERSION: &str = "5.75";

/// Request timeout; must exceed the long-poll wait.
const HTTP_TIMEOUT: Duration = Duration::from_secs(35);

/// Minimal HTTP capability the VK client needs.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request and return the response body.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> VkResult<String>;
}

/// [`HttpTransport`] backed by a shared reqwest client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> VkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> VkResult<String> {
        let body = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .text()
            .await?;
        Ok(body)
    }
}

/// VK API client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct VkClient {
    transport: Arc<dyn HttpTransport>,
    token: String,
}

impl VkClient {
    pub fn new(transport: Arc<dyn HttpTransport>, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
        }
    }

    /// Call an API method and decode its `response` field.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> VkResult<T> {
        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("access_token", self.token.clone()));
        query.push(("v", API_VERSION.to_string()));

        let url = format!("{}{}", API_URL, method);
        debug!(method, "VK API call");
        let body = self.transport.get(&url, &query).await?;

        parse_api_response(method, &body)
    }

    /// Look up users by ID, or the token owner when `user_id` is `None`.
    pub async fn users_get(&self, user_id: Option<&str>) -> VkResult<Vec<VkUser>> {
        let params: Vec<(&str, String)> = user_id
            .map(|id| vec![("user_ids", id.to_string())])
            .unwrap_or_default();
        self.call("users.get", &params).await
    }

    pub async fn get_long_poll_server(&self) -> VkResult<LongPollServer> {
        self.call("messages.getLongPollServer", &[]).await
    }

    pub async fn messages_get_by_id(&self, message_id: i64) -> VkResult<MessagesById> {
        self.call("messages.getById", &[("message_ids", message_id.to_string())])
            .await
    }

    /// Fetch photo metadata by `<owner>_<id>[_<access_key>]` reference.
    pub async fn photos_get_by_id(&self, photo: &str) -> VkResult<Vec<VkPhoto>> {
        self.call(
            "photos.getById",
            &[("photos", photo.to_string()), ("photo_sizes", "1".to_string())],
        )
        .await
    }

    /// Send a text message; returns the new message ID.
    pub async fn messages_send(&self, peer_id: i64, message: &str) -> VkResult<i64> {
        self.call(
            "messages.send",
            &[
                ("message", message.to_string()),
                ("peer_id", peer_id.to_string()),
            ],
        )
        .await
    }

    /// Raw long-poll request against a server obtained from `getLongPollServer`.
    pub async fn long_poll_check(
        &self,
        server: &str,
        key: &str,
        ts: u64,
        wait_secs: u64,
    ) -> VkResult<String> {
        let url = format!("https://{}", server);
        let query = [
            ("act", "a_check".to_string()),
            ("key", key.to_string()),
            ("wait", wait_secs.to_string()),
            ("mode", "2".to_string()),
            ("version", "3".to_string()),
            ("ts", ts.to_string()),
        ];
        self.transport.get(&url, &query).await
    }
}

/// Decode a method response, turning VK error objects into [`VkError::Api`].
fn parse_api_response<T: DeserializeOwned>(method: &str, body: &str) -> VkResult<T> {
    let value: Value = serde_json::from_str(body).map_err(|e| VkError::malformed(method, e))?;

    let Value::Object(mut object) = value else {
        return Err(VkError::malformed(method, "response is not an object"));
    };

    if let Some(error) = object.get("error") {
        return Err(VkError::Api {
            method: method.to_string(),
            code: error.get("error_code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("error_msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    let response = object
        .remove("response")
        .ok_or_else(|| VkError::malformed(method, "missing 'response' field"))?;

    serde_json::from_value(response).map_err(|e| VkError::malformed(method, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vk::mock::MockTransport;

    #[test]
    fn test_parse_api_error() {
        let result: VkResult<Vec<VkUser>> = parse_api_response(
            "users.get",
            r#"{"error":{"error_code":5,"error_msg":"User authorization failed"}}"#,
        );
        match result {
            Err(VkError::Api { code, message, .. }) => {
                assert_eq!(code, 5);
                assert_eq!(message, "User authorization failed");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let result: VkResult<i64> = parse_api_response("messages.send", "<html>502</html>");
        assert!(matches!(result, Err(VkError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_call_adds_token_and_version() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("messages.send", r#"{"response":77}"#);
        let client = VkClient::new(transport.clone(), "secret");

        let id = client.messages_send(2000000123, "Bob Lee:\nhi").await.unwrap();
        assert_eq!(id, 77);

        let call = transport.last_call("messages.send").unwrap();
        assert_eq!(call.url, "https://api.vk.com/method/messages.send");
        assert_eq!(call.param("access_token"), Some("secret"));
        assert_eq!(call.param("v"), Some(API_VERSION));
        assert_eq!(call.param("peer_id"), Some("2000000123"));
        assert_eq!(call.param("message"), Some("Bob Lee:\nhi"));
    }

    #[tokio::test]
    async fn test_users_get_self_has_no_user_ids() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            "users.get",
            r#"{"response":[{"id":1,"first_name":"Bridge","last_name":"Bot"}]}"#,
        );
        let client = VkClient::new(transport.clone(), "t");

        let users = client.users_get(None).await.unwrap();
        assert_eq!(users[0].id, 1);
        assert_eq!(transport.last_call("users.get").unwrap().param("user_ids"), None);
    }
}
