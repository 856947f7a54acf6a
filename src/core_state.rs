//! Application state shared by every request handler.
//!
//! Holds the store, gateway and repair circuit behind `Arc`s so pipelines
//! built per request share one circuit and one connection pool.

use std::sync::Arc;

use crate::config::{AppConfig, API_KEY_PREFIX};
use crate::pipeline::briefing::BriefGenerator;
use crate::pipeline::gateway::{
    resolve_credential, ApiKey, CredentialSources, GatewayError, GroqGateway, LlmGateway,
};
use crate::pipeline::processor::DocumentProcessor;
use crate::pipeline::storage::{ClientStore, SqliteStore, StorageError, SupabaseStore};
use crate::pipeline::structuring::RepairCircuit;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("API key must start with {}", API_KEY_PREFIX)]
    InvalidKey,

    #[error("HTTP client init: {0}")]
    HttpClient(String),
}

pub struct CoreState {
    pub config: AppConfig,
    /// Where client records go: Supabase when configured, else `local`.
    store: Arc<dyn ClientStore>,
    /// Always the SQLite file; also holds the saved session key.
    local: Arc<SqliteStore>,
    gateway: Arc<dyn LlmGateway>,
    circuit: Arc<RepairCircuit>,
    /// Plain client for the pass-through proxy route.
    proxy_http: reqwest::Client,
}

impl CoreState {
    /// Open the local database, pick the client store and build the gateway.
    pub fn from_config(config: AppConfig) -> Result<Self, CoreError> {
        let local = Arc::new(SqliteStore::open(&config.database_path)?);
        let store: Option<Arc<dyn ClientStore>> = match &config.supabase {
            Some(supabase) => {
                tracing::info!(url = %supabase.url, "Using Supabase client store");
                let remote: Arc<dyn ClientStore> = Arc::new(SupabaseStore::new(supabase)?);
                Some(remote)
            }
            None => None,
        };
        let gateway = Arc::new(GroqGateway::from_config(&config)?);
        Self::with_parts(config, local, store, gateway)
    }

    /// Assemble state from prebuilt parts. `store` defaults to `local`.
    pub fn with_parts(
        config: AppConfig,
        local: Arc<SqliteStore>,
        store: Option<Arc<dyn ClientStore>>,
        gateway: Arc<dyn LlmGateway>,
    ) -> Result<Self, CoreError> {
        let proxy_http = reqwest::Client::builder()
            .connect_timeout(config.llm_timeout)
            .build()
            .map_err(|e| CoreError::HttpClient(e.to_string()))?;
        let store = store.unwrap_or_else(|| local.clone() as Arc<dyn ClientStore>);
        Ok(Self {
            config,
            store,
            local,
            gateway,
            circuit: Arc::new(RepairCircuit::default()),
            proxy_http,
        })
    }

    pub fn store(&self) -> &Arc<dyn ClientStore> {
        &self.store
    }

    pub fn circuit(&self) -> &Arc<RepairCircuit> {
        &self.circuit
    }

    pub fn proxy_http(&self) -> &reqwest::Client {
        &self.proxy_http
    }

    pub fn processor(&self) -> DocumentProcessor {
        DocumentProcessor::new(
            self.gateway.clone(),
            self.store.clone(),
            self.circuit.clone(),
            &self.config.model,
        )
    }

    pub fn brief_generator(&self) -> BriefGenerator {
        BriefGenerator::new(self.gateway.clone(), self.circuit.clone(), &self.config.model)
    }

    // ─── Credentials ───

    /// Credential for a pipeline call: request header, then the saved
    /// session key, then the environment.
    pub fn credential(&self, explicit: Option<&str>) -> Result<Option<ApiKey>, CoreError> {
        let sources = CredentialSources {
            explicit: explicit.map(str::to_string),
            session: self.local.session_key()?,
            environment: self.config.environment_key.clone(),
        };
        Ok(sources.resolve())
    }

    /// Credential for the pass-through proxy: request header, then the
    /// environment. The saved session key is never lent to proxy callers.
    pub fn proxy_credential(&self, explicit: Option<&str>) -> Option<ApiKey> {
        resolve_credential(explicit, None, self.config.environment_key.as_deref())
    }

    /// Save the advisor's key, or clear it when `raw` is blank.
    /// Returns whether a key is now stored.
    pub fn set_session_key(&self, raw: &str) -> Result<bool, CoreError> {
        if raw.trim().is_empty() {
            self.local.clear_session_key()?;
            tracing::info!("Session LLM key cleared");
            return Ok(false);
        }
        let key = ApiKey::user_supplied(raw).ok_or(CoreError::InvalidKey)?;
        self.local.set_session_key(key.as_str())?;
        tracing::info!(key = ?key, "Session LLM key saved");
        // A new key gets a fresh chance at the model.
        self.reset_circuit();
        Ok(true)
    }

    /// Close the repair circuit so pipelines try the model again.
    /// Returns whether it was open.
    pub fn reset_circuit(&self) -> bool {
        let was_open = self.circuit.is_open();
        let failures = self.circuit.failures();
        self.circuit.reset();
        if failures > 0 {
            tracing::info!(failures, was_open, "Repair circuit reset");
        }
        was_open
    }
}
