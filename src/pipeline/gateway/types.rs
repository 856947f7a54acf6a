use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiKey, GatewayError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
    /// Ask the provider for a JSON object response.
    pub json_mode: bool,
}

/// Chat-completion backend (allows mocking).
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send the request and return the first choice's message content.
    async fn invoke(
        &self,
        request: &ChatRequest,
        credential: Option<&ApiKey>,
    ) -> Result<String, GatewayError>;
}
