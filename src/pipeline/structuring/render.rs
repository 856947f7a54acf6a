use serde_json::Value;

use crate::models::{ClientNote, ClientRecord, ClientSection, SectionType};

/// Split on newlines, trim each line and drop blanks.
pub fn list_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// One line becomes a string, several become a list, none becomes nothing.
pub fn section_data_from_text(text: &str) -> Option<Value> {
    let mut lines = list_from_text(text);
    match lines.len() {
        0 => None,
        1 => lines.pop().map(Value::String),
        _ => Some(Value::from(lines)),
    }
}

/// Render section data as editable text.
///
/// Lists are joined with newlines. Objects prefer their `items`, then
/// `gaps`, then `text`; anything else is pretty-printed JSON.
pub fn render_section_text(data: &Value) -> String {
    match data {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => join_lines(items),
        Value::Object(obj) => {
            if let Some(Value::Array(items)) = obj.get("items") {
                join_lines(items)
            } else if let Some(Value::Array(gaps)) = obj.get("gaps") {
                join_lines(gaps)
            } else if let Some(text) = obj.get("text").and_then(Value::as_str).filter(|t| !t.is_empty()) {
                text.to_string()
            } else {
                serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
            }
        }
        other => other.to_string(),
    }
}

fn join_lines(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rebuild the edit form for a stored client.
pub fn note_from_sections(client: &ClientRecord, sections: &[ClientSection]) -> ClientNote {
    let mut note = ClientNote {
        client_id: Some(client.client_id.clone()),
        client_name: client.client_name.clone(),
        adviser_name: client.adviser_name.clone(),
        combined_income: client.combined_income,
        net_worth: client.net_worth,
        next_review_date: client.next_review_date,
        isa_allowance_remaining: client.isa_allowance_remaining,
        status: Some(client.status),
        ..Default::default()
    };

    for section in sections {
        let side_list = match section.section_type {
            SectionType::Protection => Some(("gaps", &mut note.protection_gaps)),
            SectionType::Other => Some(("urgent_items", &mut note.urgent_items)),
            _ => None,
        };

        let text = match (side_list, &section.data) {
            (Some((field, target)), Value::Object(obj)) if obj.contains_key(field) => {
                *target = obj.get(field).map(render_section_text).unwrap_or_default();
                obj.get("text")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            }
            _ => render_section_text(&section.data),
        };

        if !text.is_empty() {
            note.sections.insert(section.section_type, text);
        }
    }
    note
}
