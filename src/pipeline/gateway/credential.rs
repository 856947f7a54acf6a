use crate::config::API_KEY_PREFIX;

/// An LLM API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Accept a key supplied by a user only if it has the provider prefix.
    pub fn user_supplied(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with(API_KEY_PREFIX) && trimmed.len() > API_KEY_PREFIX.len() {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// Accept a key from server-side configuration as-is.
    pub fn trusted(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let visible: String = self.0.chars().take(API_KEY_PREFIX.len()).collect();
        write!(f, "ApiKey({visible}***)")
    }
}

/// Every place a credential can come from, in one value.
#[derive(Debug, Clone, Default)]
pub struct CredentialSources {
    /// Per-request key, e.g. an `x-groq-key` header.
    pub explicit: Option<String>,
    /// Key the advisor saved for this installation.
    pub session: Option<String>,
    /// Key from the server environment.
    pub environment: Option<String>,
}

impl CredentialSources {
    pub fn resolve(&self) -> Option<ApiKey> {
        resolve_credential(
            self.explicit.as_deref(),
            self.session.as_deref(),
            self.environment.as_deref(),
        )
    }
}

/// Pick the credential for one call.
///
/// Precedence is explicit, then session, then environment. Explicit and
/// session keys are skipped unless they carry the provider prefix; the
/// environment key is trusted.
pub fn resolve_credential(
    explicit: Option<&str>,
    session: Option<&str>,
    environment: Option<&str>,
) -> Option<ApiKey> {
    explicit
        .and_then(ApiKey::user_supplied)
        .or_else(|| session.and_then(ApiKey::user_supplied))
        .or_else(|| environment.and_then(ApiKey::trusted))
}
