use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiKey, ChatRequest, GatewayError, LlmGateway};

/// Scripted gateway for testing. Queued replies are consumed in order; once
/// the queue is empty the fallback reply (if any) repeats.
pub struct MockGateway {
    queue: Mutex<VecDeque<Result<String, GatewayError>>>,
    fallback: Option<Result<String, GatewayError>>,
    requests: Mutex<Vec<(ChatRequest, Option<String>)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always reply with `content`.
    pub fn replying(content: &str) -> Self {
        Self {
            fallback: Some(Ok(content.to_string())),
            ..Self::new()
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: GatewayError) -> Self {
        Self {
            fallback: Some(Err(error)),
            ..Self::new()
        }
    }

    pub fn push(self, reply: Result<String, GatewayError>) -> Self {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Requests seen so far, with the credential each one carried.
    pub fn requests(&self) -> Vec<(ChatRequest, Option<String>)> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn invoke(
        &self,
        request: &ChatRequest,
        credential: Option<&ApiKey>,
    ) -> Result<String, GatewayError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((request.clone(), credential.map(|k| k.as_str().to_string())));

        let queued = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        queued.or_else(|| self.fallback.clone()).unwrap_or_else(|| {
            Err(GatewayError::NetworkUnreachable(
                "mock gateway has no scripted reply".into(),
            ))
        })
    }
}
