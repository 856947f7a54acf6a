//! Persistence adapter. The pipeline talks to a [`ClientStore`]; the local
//! SQLite file and the hosted PostgREST store both implement it.

pub mod sqlite_store;
pub mod supabase;
pub mod types;

pub use sqlite_store::*;
pub use supabase::*;
pub use types::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[source] DatabaseError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Cannot reach remote store: {0}")]
    Connection(String),

    #[error("Local store lock poisoned")]
    LockPoisoned,
}

impl From<DatabaseError> for StorageError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::ConstraintViolation(msg) => StorageError::Conflict(msg),
            DatabaseError::NotFound { entity_type, id } => {
                StorageError::NotFound(format!("{entity_type} {id}"))
            }
            other => StorageError::Database(other),
        }
    }
}
