//! VK user display-name cache.
//!
//! Names are looked up with `users.get` on a miss and kept until the hard
//! TTL elapses. There is no soft-expiry refresh: an entry is either present
//! and valid, or gone. Both forwarding directions share one cache; writes
//! for the same key are deterministic so last-write-wins is fine.

use std::time::Duration;

use mini_moka::sync::Cache;
use tracing::debug;

use crate::common::error::LookupError;
use crate::common::UserName;
use crate::vk::api::VkClient;

/// Age at which an entry is evicted.
pub const HARD_TTL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on cached users.
const MAX_CACHE_ENTRIES: u64 = 10_000;

/// Maps VK user IDs to display names.
pub struct IdentityCache {
    api: VkClient,
    names: Cache<String, UserName>,
}

impl IdentityCache {
    pub fn new(api: VkClient) -> Self {
        Self::with_ttl(api, HARD_TTL)
    }

    pub fn with_ttl(api: VkClient, ttl: Duration) -> Self {
        let names = Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(ttl)
            .build();

        Self { api, names }
    }

    /// Resolve a user's name, hitting the API only on a cache miss.
    ///
    /// An empty `user_id` resolves the token owner.
    pub async fn resolve(&self, user_id: &str) -> Result<UserName, LookupError> {
        if let Some(name) = self.names.get(&user_id.to_string()) {
            return Ok(name);
        }

        let query = (!user_id.is_empty()).then_some(user_id);
        let users = self
            .api
            .users_get(query)
            .await
            .map_err(|source| LookupError::Remote {
                user_id: user_id.to_string(),
                source,
            })?;

        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound {
                user_id: user_id.to_string(),
            })?;

        let name = UserName::new(user.first_name, user.last_name);
        debug!(user_id, name = %name.full(), "Cached VK user name");

        self.names.insert(user_id.to_string(), name.clone());

        Ok(name)
    }
}

/// Numeric ID of the token owner, used to recognise the bridge's own messages.
pub async fn current_user_id(api: &VkClient) -> Result<i64, LookupError> {
    let users = api
        .users_get(None)
        .await
        .map_err(|source| LookupError::Remote {
            user_id: String::new(),
            source,
        })?;

    users
        .first()
        .map(|user| user.id)
        .ok_or_else(|| LookupError::NotFound {
            user_id: String::new(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::vk::mock::MockTransport;

    const JANE: &str = r#"{"response":[{"id":42,"first_name":"Jane","last_name":"Doe"}]}"#;

    fn cache_with(transport: &Arc<MockTransport>) -> IdentityCache {
        IdentityCache::new(VkClient::new(transport.clone(), "t"))
    }

    fn is_cached(cache: &IdentityCache, user_id: &str) -> bool {
        cache.names.contains_key(&user_id.to_string())
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("users.get", JANE);
        let cache = cache_with(&transport);

        let first = cache.resolve("42").await.unwrap();
        assert_eq!(transport.call_count("users.get"), 1);
        assert_eq!(
            transport.last_call("users.get").unwrap().param("user_ids"),
            Some("42")
        );

        let second = cache.resolve("42").await.unwrap();
        assert_eq!(transport.call_count("users.get"), 1);
        assert_eq!(first, second);
        assert_eq!(second, UserName::new("Jane", "Doe"));
    }

    #[tokio::test]
    async fn test_entry_evicted_after_ttl() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("users.get", JANE);
        let cache = IdentityCache::with_ttl(
            VkClient::new(transport.clone(), "t"),
            Duration::from_millis(50),
        );

        cache.resolve("42").await.unwrap();
        cache.resolve("42").await.unwrap();
        assert_eq!(transport.call_count("users.get"), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!is_cached(&cache, "42"));

        cache.resolve("42").await.unwrap();
        assert_eq!(transport.call_count("users.get"), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolve_shares_one_entry() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("users.get", JANE);
        let cache = Arc::new(cache_with(&transport));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.resolve("42").await })
            })
            .collect();

        for task in tasks {
            let name = task.await.unwrap().unwrap();
            assert_eq!(name.full(), "Jane Doe");
        }

        assert!(is_cached(&cache, "42"));
        let lookups = transport.call_count("users.get");
        assert!(lookups >= 1);

        cache.resolve("42").await.unwrap();
        assert_eq!(transport.call_count("users.get"), lookups);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_found() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("users.get", r#"{"response":[]}"#);
        let cache = cache_with(&transport);

        let result = cache.resolve("42").await;
        assert!(matches!(result, Err(LookupError::NotFound { .. })));
        assert!(!is_cached(&cache, "42"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_not_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.fail("users.get");
        let cache = cache_with(&transport);

        assert!(matches!(
            cache.resolve("42").await,
            Err(LookupError::Remote { .. })
        ));
        assert!(!is_cached(&cache, "42"));
    }

    #[tokio::test]
    async fn test_empty_id_resolves_self() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            "users.get",
            r#"{"response":[{"id":7,"first_name":"Bridge","last_name":"Bot"}]}"#,
        );
        let cache = cache_with(&transport);

        let name = cache.resolve("").await.unwrap();
        assert_eq!(name.full(), "Bridge Bot");
        assert_eq!(transport.last_call("users.get").unwrap().param("user_ids"), None);
    }

    #[tokio::test]
    async fn test_current_user_id() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            "users.get",
            r#"{"response":[{"id":7,"first_name":"Bridge","last_name":"Bot"}]}"#,
        );
        let api = VkClient::new(transport.clone(), "t");
        assert_eq!(current_user_id(&api).await.unwrap(), 7);

        let empty = Arc::new(MockTransport::new());
        empty.respond("users.get", r#"{"response":[]}"#);
        let api = VkClient::new(empty.clone(), "t");
        assert!(matches!(
            current_user_id(&api).await,
            Err(LookupError::NotFound { .. })
        ));
    }
}
