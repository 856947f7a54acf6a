use std::str::FromStr;

use rusqlite::{params, Connection, Row};

use super::parse_date_column;
use crate::db::DatabaseError;
use crate::models::*;

const CLIENT_COLUMNS: &str = "client_id, client_name, adviser_name, combined_income, net_worth,
    last_updated, next_review_date, isa_allowance_remaining, has_protection_gaps,
    has_urgent_items, review_overdue, status";

pub fn insert_client(conn: &Connection, client: &ClientRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clients (client_id, client_name, adviser_name, combined_income, net_worth,
         last_updated, next_review_date, isa_allowance_remaining, has_protection_gaps,
         has_urgent_items, review_overdue, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            client.client_id,
            client.client_name,
            client.adviser_name,
            client.combined_income,
            client.net_worth,
            client.last_updated.map(|d| d.to_string()),
            client.next_review_date.map(|d| d.to_string()),
            client.isa_allowance_remaining,
            client.has_protection_gaps as i32,
            client.has_urgent_items as i32,
            client.review_overdue as i32,
            client.status.as_str(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

/// Overwrite every mutable column. The identifier itself never changes.
pub fn update_client(conn: &Connection, client: &ClientRecord) -> Result<(), DatabaseError> {
    let rows = conn
        .execute(
            "UPDATE clients SET client_name = ?2, adviser_name = ?3, combined_income = ?4,
             net_worth = ?5, last_updated = ?6, next_review_date = ?7,
             isa_allowance_remaining = ?8, has_protection_gaps = ?9, has_urgent_items = ?10,
             review_overdue = ?11, status = ?12
             WHERE client_id = ?1",
            params![
                client.client_id,
                client.client_name,
                client.adviser_name,
                client.combined_income,
                client.net_worth,
                client.last_updated.map(|d| d.to_string()),
                client.next_review_date.map(|d| d.to_string()),
                client.isa_allowance_remaining,
                client.has_protection_gaps as i32,
                client.has_urgent_items as i32,
                client.review_overdue as i32,
                client.status.as_str(),
            ],
        )
        .map_err(DatabaseError::from_write)?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Client".into(),
            id: client.client_id.clone(),
        });
    }
    Ok(())
}

pub fn get_client(conn: &Connection, client_id: &str) -> Result<Option<ClientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE client_id = ?1"
    ))?;

    match stmt.query_row(params![client_id], read_client_row) {
        Ok(row) => Ok(Some(client_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All clients, soonest review first; clients without a review date last.
pub fn list_clients(conn: &Connection) -> Result<Vec<ClientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients
         ORDER BY next_review_date IS NULL, next_review_date ASC, client_name ASC"
    ))?;

    let rows = stmt.query_map([], read_client_row)?;
    let mut clients = Vec::new();
    for row in rows {
        clients.push(client_from_row(row?)?);
    }
    Ok(clients)
}

struct ClientRow {
    client_id: String,
    client_name: String,
    adviser_name: Option<String>,
    combined_income: Option<f64>,
    net_worth: Option<f64>,
    last_updated: Option<String>,
    next_review_date: Option<String>,
    isa_allowance_remaining: Option<f64>,
    has_protection_gaps: i32,
    has_urgent_items: i32,
    review_overdue: i32,
    status: String,
}

fn read_client_row(row: &Row<'_>) -> rusqlite::Result<ClientRow> {
    Ok(ClientRow {
        client_id: row.get(0)?,
        client_name: row.get(1)?,
        adviser_name: row.get(2)?,
        combined_income: row.get(3)?,
        net_worth: row.get(4)?,
        last_updated: row.get(5)?,
        next_review_date: row.get(6)?,
        isa_allowance_remaining: row.get(7)?,
        has_protection_gaps: row.get(8)?,
        has_urgent_items: row.get(9)?,
        review_overdue: row.get(10)?,
        status: row.get(11)?,
    })
}

fn client_from_row(row: ClientRow) -> Result<ClientRecord, DatabaseError> {
    Ok(ClientRecord {
        client_id: row.client_id,
        client_name: row.client_name,
        adviser_name: row.adviser_name,
        combined_income: row.combined_income,
        net_worth: row.net_worth,
        last_updated: parse_date_column("last_updated", row.last_updated)?,
        next_review_date: parse_date_column("next_review_date", row.next_review_date)?,
        isa_allowance_remaining: row.isa_allowance_remaining,
        has_protection_gaps: row.has_protection_gaps != 0,
        has_urgent_items: row.has_urgent_items != 0,
        review_overdue: row.review_overdue != 0,
        status: ClientStatus::from_str(&row.status)?,
    })
}
