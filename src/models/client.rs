use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::{ClientStatus, SectionType};

/// One advised household. `client_id` is immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub client_name: String,
    pub adviser_name: Option<String>,
    pub combined_income: Option<f64>,
    pub net_worth: Option<f64>,
    pub last_updated: Option<NaiveDate>,
    pub next_review_date: Option<NaiveDate>,
    pub isa_allowance_remaining: Option<f64>,
    pub has_protection_gaps: bool,
    pub has_urgent_items: bool,
    pub review_overdue: bool,
    pub status: ClientStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSection {
    pub client_id: String,
    pub section_type: SectionType,
    pub data: Value,
}

/// Manual-entry form. Section bodies, protection gaps and urgent items are
/// free text, one entry per line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientNote {
    pub client_id: Option<String>,
    pub client_name: String,
    pub adviser_name: Option<String>,
    pub combined_income: Option<f64>,
    pub net_worth: Option<f64>,
    pub next_review_date: Option<NaiveDate>,
    pub isa_allowance_remaining: Option<f64>,
    pub status: Option<ClientStatus>,
    pub sections: BTreeMap<SectionType, String>,
    pub protection_gaps: String,
    pub urgent_items: String,
}

/// Everything the dashboard shows for one client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientDetail {
    pub client: ClientRecord,
    pub sections: Vec<ClientSection>,
    pub latest_document: Option<super::ParsedDocumentRecord>,
    /// The record as an edit form; `PUT /api/clients/:id` accepts it back.
    pub note: ClientNote,
}
