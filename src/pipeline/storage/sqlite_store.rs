use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;

use super::{ClientStore, StorageError};
use crate::db::{self, repository};
use crate::models::{ClientRecord, ClientSection, ParsedDocumentRecord};

/// Preference key under which the advisor's saved LLM key is kept.
pub const SESSION_KEY_PREFERENCE: &str = "llm_session_key";

/// Local single-file store. The connection is guarded by a mutex and never
/// held across an await point.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) and migrate the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Local store opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    // ─── Session credential ───

    pub fn session_key(&self) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        Ok(repository::get_user_preference(&conn, SESSION_KEY_PREFERENCE)?)
    }

    pub fn set_session_key(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        repository::set_user_preference(&conn, SESSION_KEY_PREFERENCE, key)?;
        Ok(())
    }

    pub fn clear_session_key(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        repository::delete_user_preference(&conn, SESSION_KEY_PREFERENCE)?;
        Ok(())
    }
}

#[async_trait]
impl ClientStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), StorageError> {
        let conn = self.conn()?;
        Ok(repository::insert_client(&conn, client)?)
    }

    async fn update_client(&self, client: &ClientRecord) -> Result<(), StorageError> {
        let conn = self.conn()?;
        Ok(repository::update_client(&conn, client)?)
    }

    async fn insert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError> {
        let conn = self.conn()?;
        Ok(repository::insert_sections(&conn, sections)?)
    }

    async fn upsert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError> {
        let conn = self.conn()?;
        Ok(repository::upsert_sections(&conn, sections)?)
    }

    async fn insert_parsed_document(&self, doc: &ParsedDocumentRecord) -> Result<(), StorageError> {
        let conn = self.conn()?;
        Ok(repository::insert_parsed_document(&conn, doc)?)
    }

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StorageError> {
        let conn = self.conn()?;
        Ok(repository::list_clients(&conn)?)
    }

    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, StorageError> {
        let conn = self.conn()?;
        Ok(repository::get_client(&conn, client_id)?)
    }

    async fn client_sections(&self, client_id: &str) -> Result<Vec<ClientSection>, StorageError> {
        let conn = self.conn()?;
        Ok(repository::get_sections(&conn, client_id)?)
    }

    async fn latest_parsed_document(
        &self,
        client_id: &str,
    ) -> Result<Option<ParsedDocumentRecord>, StorageError> {
        let conn = self.conn()?;
        Ok(repository::get_latest_parsed_document(&conn, client_id)?)
    }
}
