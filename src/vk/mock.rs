//! In-memory [`HttpTransport`] for tests.
//!
//! Responses are queued per endpoint key: the method name for API calls
//! (`users.get`) or the `act` parameter for long-poll requests (`a_check`).
//! Once a key's queue is drained, its last response keeps being replayed,
//! unless the mock was built with [`MockTransport::stalling`], in which case
//! drained requests never complete.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::common::error::{VkError, VkResult};
use crate::vk::api::HttpTransport;

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub key: String,
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Option<String>>>>,
    replay: Mutex<HashMap<String, Option<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
    stall_when_drained: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose requests hang once their queue is empty.
    pub fn stalling() -> Self {
        let mock = Self::default();
        mock.stall_when_drained.store(true, Ordering::SeqCst);
        mock
    }

    /// Queue a response body for an endpoint key.
    pub fn respond(&self, key: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Some(body.to_string()));
    }

    /// Queue a transport failure for an endpoint key.
    pub fn fail(&self, key: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(None);
    }

    pub fn calls(&self, key: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.key == key)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls(key).len()
    }

    pub fn last_call(&self, key: &str) -> Option<RecordedCall> {
        self.calls(key).pop()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> VkResult<String> {
        let key = query
            .iter()
            .find(|(k, _)| *k == "act")
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| url.rsplit('/').next().unwrap_or(url).to_string());

        self.calls.lock().unwrap().push(RecordedCall {
            key: key.clone(),
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });

        let queued = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        if queued.is_none() && self.stall_when_drained.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }

        let next = {
            let mut replay = self.replay.lock().unwrap();
            match queued {
                Some(response) => {
                    replay.insert(key.clone(), response.clone());
                    response
                }
                None => replay.get(&key).cloned().flatten(),
            }
        };

        next.ok_or_else(|| VkError::empty(format!("{} (mock transport)", key)))
    }
}
