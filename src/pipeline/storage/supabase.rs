use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::{ClientStore, StorageError};
use crate::config::SupabaseConfig;
use crate::models::{ClientRecord, ClientSection, ParsedDocumentRecord};
use crate::pipeline::gateway::normalize_error_body;

const REMOTE_TIMEOUT_SECS: u64 = 15;

const CLIENTS: &str = "clients";
const CLIENT_DATA: &str = "client_data";
const PARSED_DOCUMENTS: &str = "parsed_documents";

/// Hosted store reached through PostgREST (`{url}/rest/v1/{table}`).
pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, StorageError> {
        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = normalize_error_body(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), message = %message, "Remote store rejected request");
        if status == StatusCode::CONFLICT {
            return Err(StorageError::Conflict(message));
        }
        Err(StorageError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>, StorageError> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        response.json::<Vec<T>>().await.map_err(|e| StorageError::Remote {
            status,
            message: format!("Unreadable response: {e}"),
        })
    }

    async fn insert_rows<T: serde::Serialize + Sync>(
        &self,
        table: &str,
        rows: &[T],
    ) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .request(Method::POST, self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(rows);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ClientStore for SupabaseStore {
    fn backend(&self) -> &'static str {
        "supabase"
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), StorageError> {
        self.insert_rows(CLIENTS, std::slice::from_ref(client)).await
    }

    async fn update_client(&self, client: &ClientRecord) -> Result<(), StorageError> {
        let request = self
            .request(Method::PATCH, self.table_url(CLIENTS))
            .query(&[("client_id", format!("eq.{}", client.client_id))])
            .header("Prefer", "return=representation")
            .json(client);
        let updated: Vec<serde_json::Value> = self.rows(request).await?;
        if updated.is_empty() {
            return Err(StorageError::NotFound(format!("Client {}", client.client_id)));
        }
        Ok(())
    }

    async fn insert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError> {
        self.insert_rows(CLIENT_DATA, sections).await
    }

    async fn upsert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError> {
        if sections.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{}?on_conflict=client_id,section_type",
            self.table_url(CLIENT_DATA)
        );
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(sections);
        self.send(request).await?;
        Ok(())
    }

    async fn insert_parsed_document(&self, doc: &ParsedDocumentRecord) -> Result<(), StorageError> {
        self.insert_rows(PARSED_DOCUMENTS, std::slice::from_ref(doc)).await
    }

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StorageError> {
        let request = self
            .request(Method::GET, self.table_url(CLIENTS))
            .query(&[("select", "*"), ("order", "next_review_date.asc.nullslast")]);
        self.rows(request).await
    }

    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, StorageError> {
        let request = self.request(Method::GET, self.table_url(CLIENTS)).query(&[
            ("select", "*".to_string()),
            ("client_id", format!("eq.{client_id}")),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<ClientRecord> = self.rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn client_sections(&self, client_id: &str) -> Result<Vec<ClientSection>, StorageError> {
        let request = self.request(Method::GET, self.table_url(CLIENT_DATA)).query(&[
            ("select", "client_id,section_type,data".to_string()),
            ("client_id", format!("eq.{client_id}")),
        ]);
        let mut sections: Vec<ClientSection> = self.rows(request).await?;
        sections.sort_by_key(|s| s.section_type);
        Ok(sections)
    }

    async fn latest_parsed_document(
        &self,
        client_id: &str,
    ) -> Result<Option<ParsedDocumentRecord>, StorageError> {
        let request = self
            .request(Method::GET, self.table_url(PARSED_DOCUMENTS))
            .query(&[
                ("select", "*".to_string()),
                ("client_id", format!("eq.{client_id}")),
                ("order", "upload_date.desc".to_string()),
                ("limit", "1".to_string()),
            ]);
        let rows: Vec<ParsedDocumentRecord> = self.rows(request).await?;
        Ok(rows.into_iter().next())
    }
}
