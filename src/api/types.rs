//! Shared types for the API layer.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::pipeline::gateway::ApiKey;

/// Header carrying a per-request LLM key.
pub const LLM_KEY_HEADER: &str = "x-groq-key";

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Resolve the LLM credential for a pipeline request.
    pub fn credential(&self, headers: &HeaderMap) -> Result<Option<ApiKey>, ApiError> {
        Ok(self.core.credential(header_key(headers))?)
    }
}

/// The `x-groq-key` header, if present and readable.
pub fn header_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(LLM_KEY_HEADER).and_then(|v| v.to_str().ok())
}
