use async_trait::async_trait;

use super::StorageError;
use crate::models::{ClientRecord, ClientSection, ParsedDocumentRecord};

/// Where client records live. Implementations are shared across request
/// handlers, so every method takes `&self`.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Short label for logs ("sqlite", "supabase").
    fn backend(&self) -> &'static str;

    /// Fails with `Conflict` when the identifier already exists.
    async fn insert_client(&self, client: &ClientRecord) -> Result<(), StorageError>;

    /// Fails with `NotFound` when no row matches `client.client_id`.
    async fn update_client(&self, client: &ClientRecord) -> Result<(), StorageError>;

    /// Fails with `Conflict` if any (client, section type) pair exists.
    async fn insert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError>;

    /// Insert or overwrite by (client, section type).
    async fn upsert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError>;

    async fn insert_parsed_document(&self, doc: &ParsedDocumentRecord) -> Result<(), StorageError>;

    /// Soonest review first, clients without a review date last.
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StorageError>;

    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, StorageError>;

    /// Sections in display order.
    async fn client_sections(&self, client_id: &str) -> Result<Vec<ClientSection>, StorageError>;

    async fn latest_parsed_document(
        &self,
        client_id: &str,
    ) -> Result<Option<ParsedDocumentRecord>, StorageError>;
}
