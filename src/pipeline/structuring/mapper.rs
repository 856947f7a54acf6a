use chrono::{NaiveDate, Utc};
use serde_json::{json, Map, Value};

use super::render::{list_from_text, section_data_from_text};
use super::StructuringError;
use crate::models::{ClientNote, ClientRecord, ClientSection, ClientStatus, SectionType};

/// Identifier stem used when a name has no usable last word.
const FALLBACK_ID_STEM: &str = "CLIENT";

/// Extraction keys that map one-to-one onto a section, in row order.
const SECTION_KEYS: &[(&str, SectionType)] = &[
    ("personal_details", SectionType::PersonalDetails),
    ("financial_summary", SectionType::FinancialSummary),
    ("assets", SectionType::Assets),
    ("pensions", SectionType::Pensions),
    ("protection", SectionType::Protection),
    ("goals", SectionType::Goals),
    ("recommendations", SectionType::Recommendations),
    ("opportunities", SectionType::Opportunities),
    ("risks", SectionType::Risks),
    ("recent_changes", SectionType::RecentChanges),
    ("tax_position", SectionType::TaxPosition),
    ("communication_log", SectionType::CommunicationLog),
];

/// Clock inputs for one mapping call.
#[derive(Debug, Clone, Copy)]
pub struct MappingContext {
    pub today: NaiveDate,
    pub now_millis: i64,
}

impl MappingContext {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            today: now.date_naive(),
            now_millis: now.timestamp_millis(),
        }
    }
}

/// `LASTNAME_NNNN`: last word of the name, uppercased, plus the last four
/// digits of the epoch millisecond clock. Not idempotent.
pub fn derive_client_id(client_name: &str, now_millis: i64) -> String {
    let stem: String = client_name
        .split_whitespace()
        .last()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect();
    let stem = if stem.is_empty() {
        FALLBACK_ID_STEM.to_string()
    } else {
        stem
    };
    format!("{stem}_{:04}", now_millis.rem_euclid(10_000))
}

/// Supplied identifier when non-blank, otherwise a derived one.
pub fn normalize_client_id(supplied: Option<&str>, client_name: &str, now_millis: i64) -> String {
    match supplied.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => derive_client_id(client_name, now_millis),
    }
}

/// Map an extraction payload onto a client row and its sections.
///
/// `client.client_name` is mandatory. Every other field is optional and
/// coerced leniently: non-numeric values become `None`, non-ISO dates
/// become `None`. Top-level fields that are absent or null produce no
/// section row; `urgent_items` is stored under `other`.
pub fn map_extraction(
    payload: &Value,
    ctx: &MappingContext,
) -> Result<(ClientRecord, Vec<ClientSection>), StructuringError> {
    let client = payload
        .get("client")
        .and_then(Value::as_object)
        .ok_or_else(|| StructuringError::Validation("no client data found in payload".into()))?;

    let client_name = string_field(client, "client_name")
        .ok_or_else(|| StructuringError::Validation("client.client_name is required".into()))?;

    let supplied_id = match client.get("client_id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let client_id = normalize_client_id(supplied_id.as_deref(), &client_name, ctx.now_millis);

    let next_review_date = coerce_date(client.get("next_review_date"));
    let record = ClientRecord {
        client_id: client_id.clone(),
        adviser_name: string_field(client, "adviser_name"),
        combined_income: coerce_number(client.get("combined_income")),
        net_worth: coerce_number(client.get("net_worth")),
        last_updated: coerce_date(client.get("last_updated")).or(Some(ctx.today)),
        next_review_date,
        isa_allowance_remaining: coerce_number(client.get("isa_allowance_remaining")),
        has_protection_gaps: has_entries(payload.pointer("/protection/gaps")),
        has_urgent_items: has_entries(payload.get("urgent_items")),
        review_overdue: is_overdue(next_review_date, ctx.today),
        status: ClientStatus::Active,
        client_name,
    };

    let mut sections: Vec<ClientSection> = SECTION_KEYS
        .iter()
        .filter_map(|(key, section_type)| {
            present(payload.get(*key)).map(|data| ClientSection {
                client_id: client_id.clone(),
                section_type: *section_type,
                data: data.clone(),
            })
        })
        .collect();

    if let Some(urgent) = present(payload.get("urgent_items")) {
        sections.push(ClientSection {
            client_id: client_id.clone(),
            section_type: SectionType::Other,
            data: json!({ "urgent_items": urgent }),
        });
    }

    tracing::debug!(
        client_id = %record.client_id,
        sections = sections.len(),
        has_protection_gaps = record.has_protection_gaps,
        review_overdue = record.review_overdue,
        "Extraction payload mapped"
    );
    Ok((record, sections))
}

/// Map a manual-entry note the same way an extraction payload is mapped.
///
/// Section text of one line is stored as a string, several lines as a list.
/// Protection gaps and urgent items join the `protection` and `other`
/// sections as `gaps` / `urgent_items` lists.
pub fn map_note(
    note: &ClientNote,
    ctx: &MappingContext,
) -> Result<(ClientRecord, Vec<ClientSection>), StructuringError> {
    let client_name = note.client_name.trim();
    if client_name.is_empty() {
        return Err(StructuringError::Validation("client_name is required".into()));
    }

    let client_id = normalize_client_id(note.client_id.as_deref(), client_name, ctx.now_millis);
    let gaps = list_from_text(&note.protection_gaps);
    let urgent = list_from_text(&note.urgent_items);

    let record = ClientRecord {
        client_id: client_id.clone(),
        client_name: client_name.to_string(),
        adviser_name: note
            .adviser_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        combined_income: note.combined_income.filter(|v| v.is_finite()),
        net_worth: note.net_worth.filter(|v| v.is_finite()),
        last_updated: Some(ctx.today),
        next_review_date: note.next_review_date,
        isa_allowance_remaining: note.isa_allowance_remaining.filter(|v| v.is_finite()),
        has_protection_gaps: !gaps.is_empty(),
        has_urgent_items: !urgent.is_empty(),
        review_overdue: is_overdue(note.next_review_date, ctx.today),
        status: note.status.unwrap_or(ClientStatus::Active),
    };

    let mut sections = Vec::new();
    for section_type in SectionType::ALL {
        let text = note
            .sections
            .get(&section_type)
            .map(String::as_str)
            .unwrap_or("");
        let extra = match section_type {
            SectionType::Protection => Some(("gaps", &gaps)),
            SectionType::Other => Some(("urgent_items", &urgent)),
            _ => None,
        };

        let data = match extra {
            Some((field, list)) if !list.is_empty() => {
                let mut obj = Map::new();
                if !text.trim().is_empty() {
                    obj.insert("text".into(), Value::String(text.trim().to_string()));
                }
                obj.insert(field.into(), json!(list));
                Some(Value::Object(obj))
            }
            _ => section_data_from_text(text),
        };

        if let Some(data) = data {
            sections.push(ClientSection {
                client_id: client_id.clone(),
                section_type,
                data,
            });
        }
    }

    Ok((record, sections))
}

/// Strictly before today; a review due today is not overdue.
pub fn is_overdue(next_review_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    next_review_date.is_some_and(|d| d < today)
}

/// Finite JSON numbers and plain numeric strings; anything else is `None`.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// `YYYY-MM-DD` strings only.
pub fn coerce_date(value: Option<&Value>) -> Option<NaiveDate> {
    value
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// A list with at least one non-blank entry, or a non-blank string.
fn has_entries(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => items.iter().any(|item| match item {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }),
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => false,
    }
}
