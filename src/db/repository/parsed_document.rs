use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_parsed_document(
    conn: &Connection,
    doc: &ParsedDocumentRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO parsed_documents (id, client_id, filename, file_size, raw_text,
         structured_json, parse_status, ai_model_used, upload_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            doc.id.to_string(),
            doc.client_id,
            doc.filename,
            doc.file_size.map(|s| s as i64),
            doc.raw_text,
            doc.structured_json.to_string(),
            doc.parse_status.as_str(),
            doc.ai_model_used,
            doc.upload_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

/// Most recent import for a client, if any.
pub fn get_latest_parsed_document(
    conn: &Connection,
    client_id: &str,
) -> Result<Option<ParsedDocumentRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, client_id, filename, file_size, raw_text, structured_json, parse_status,
         ai_model_used, upload_date
         FROM parsed_documents WHERE client_id = ?1
         ORDER BY upload_date DESC LIMIT 1",
    )?;

    let result = stmt.query_row(params![client_id], |row| {
        Ok(ParsedDocumentRow {
            id: row.get(0)?,
            client_id: row.get(1)?,
            filename: row.get(2)?,
            file_size: row.get(3)?,
            raw_text: row.get(4)?,
            structured_json: row.get(5)?,
            parse_status: row.get(6)?,
            ai_model_used: row.get(7)?,
            upload_date: row.get(8)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(parsed_document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct ParsedDocumentRow {
    id: String,
    client_id: String,
    filename: String,
    file_size: Option<i64>,
    raw_text: String,
    structured_json: String,
    parse_status: String,
    ai_model_used: Option<String>,
    upload_date: String,
}

fn corrupt(column: &str, reason: impl ToString) -> DatabaseError {
    DatabaseError::CorruptColumn {
        column: column.into(),
        reason: reason.to_string(),
    }
}

fn parsed_document_from_row(row: ParsedDocumentRow) -> Result<ParsedDocumentRecord, DatabaseError> {
    Ok(ParsedDocumentRecord {
        id: Uuid::parse_str(&row.id).map_err(|e| corrupt("parsed_documents.id", e))?,
        client_id: row.client_id,
        filename: row.filename,
        file_size: row.file_size.and_then(|s| u64::try_from(s).ok()),
        raw_text: row.raw_text,
        structured_json: serde_json::from_str(&row.structured_json)
            .map_err(|e| corrupt("parsed_documents.structured_json", e))?,
        parse_status: ParseStatus::from_str(&row.parse_status)?,
        ai_model_used: row.ai_model_used,
        upload_date: DateTime::parse_from_rfc3339(&row.upload_date)
            .map_err(|e| corrupt("parsed_documents.upload_date", e))?
            .with_timezone(&Utc),
    })
}
