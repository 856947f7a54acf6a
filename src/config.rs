use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "ClientDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hosted chat-completion endpoint the proxy and direct gateway talk to.
pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Model used for both extraction and brief generation.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Hard ceiling on a single LLM invocation.
pub const LLM_TIMEOUT_SECS: u64 = 30;

/// Keys supplied by a user (request header, saved session key) must carry
/// this prefix to be honoured. Environment keys are trusted as-is.
pub const API_KEY_PREFIX: &str = "gsk_";

pub const DEFAULT_PORT: u16 = 8787;

/// Largest upload accepted by the document parse route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Get the application data directory
/// ~/ClientDesk/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the local SQLite database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("clientdesk.db")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clientdesk=info,clientdesk_lib=info,tower_http=warn"
}

/// Where the hosted store lives, when one is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub model: String,
    /// Upstream chat-completions URL (direct gateway candidate and proxy target).
    pub groq_url: String,
    /// Base URL of a proxy exposing `/api/groq`, tried before the direct URL.
    pub api_base: Option<String>,
    /// Credential from `GROQ_API_KEY` / `VITE_GROQ_API_KEY`.
    pub environment_key: Option<String>,
    pub llm_timeout: Duration,
    pub supabase: Option<SupabaseConfig>,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            _ => None,
        };

        Self {
            port,
            database_path: get("CLIENTDESK_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            model: get("CLIENTDESK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            groq_url: get("CLIENTDESK_GROQ_URL").unwrap_or_else(|| GROQ_CHAT_URL.to_string()),
            api_base: get("CLIENTDESK_API_BASE")
                .or_else(|| get("VITE_API_BASE"))
                .map(|base| base.trim_end_matches('/').to_string()),
            environment_key: get("GROQ_API_KEY").or_else(|| get("VITE_GROQ_API_KEY")),
            llm_timeout: Duration::from_secs(LLM_TIMEOUT_SECS),
            supabase,
        }
    }
}
