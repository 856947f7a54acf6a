use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

/// Insert sections as one batch. A duplicate (client, section_type) fails
/// the whole batch with `ConstraintViolation`.
pub fn insert_sections(conn: &Connection, sections: &[ClientSection]) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    for section in sections {
        tx.execute(
            "INSERT INTO client_data (client_id, section_type, data) VALUES (?1, ?2, ?3)",
            params![
                section.client_id,
                section.section_type.as_str(),
                section.data.to_string(),
            ],
        )
        .map_err(DatabaseError::from_write)?;
    }
    tx.commit()?;
    Ok(())
}

/// Insert or replace sections keyed on (client_id, section_type).
pub fn upsert_sections(conn: &Connection, sections: &[ClientSection]) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    for section in sections {
        tx.execute(
            "INSERT INTO client_data (client_id, section_type, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(client_id, section_type)
             DO UPDATE SET data = excluded.data, updated_at = datetime('now')",
            params![
                section.client_id,
                section.section_type.as_str(),
                section.data.to_string(),
            ],
        )
        .map_err(DatabaseError::from_write)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_sections(conn: &Connection, client_id: &str) -> Result<Vec<ClientSection>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT section_type, data FROM client_data WHERE client_id = ?1")?;
    let rows = stmt.query_map(params![client_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut sections = Vec::new();
    for row in rows {
        let (section_type, data) = row?;
        sections.push(ClientSection {
            client_id: client_id.to_string(),
            section_type: SectionType::from_str(&section_type)?,
            data: serde_json::from_str(&data).map_err(|e| DatabaseError::CorruptColumn {
                column: "client_data.data".into(),
                reason: e.to_string(),
            })?,
        });
    }
    sections.sort_by_key(|s| s.section_type);
    Ok(sections)
}
