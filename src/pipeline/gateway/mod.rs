//! LLM gateway: one chat-completion call with a hard timeout, credential
//! resolution, endpoint candidates and normalised upstream errors.

pub mod client;
pub mod credential;
pub mod mock;
pub mod types;

pub use client::*;
pub use credential::*;
pub use mock::*;
pub use types::*;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Upstream timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("LLM credential rejected or missing: {0}")]
    Unauthorized(String),

    #[error("LLM upstream returned {status}: {message}")]
    UpstreamError { status: u16, message: String },

    #[error("No LLM endpoint reachable: {0}")]
    NetworkUnreachable(String),
}

impl GatewayError {
    /// Short advisor-facing explanation, used as the fallback notice.
    pub fn notice(&self) -> String {
        match self {
            GatewayError::Timeout { after } => format!(
                "The AI service did not respond within {}s.",
                after.as_secs().max(1)
            ),
            GatewayError::Unauthorized(_) => {
                "The AI service rejected the API key. Check the key in settings.".to_string()
            }
            GatewayError::UpstreamError { status, message } => {
                format!("The AI service returned an error ({status}): {message}")
            }
            GatewayError::NetworkUnreachable(_) => {
                "The AI service could not be reached.".to_string()
            }
        }
    }
}
