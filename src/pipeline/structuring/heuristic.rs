use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Map, Value};

// ─── Patterns ───
// Labels as advisers write them in file notes: "Client: ...", "Net worth £2.85m".

const AMOUNT: &str = r"(£?\s*\d[\d,]*(?:\.\d+)?\s*(?:bn|billion|m|million|k|thousand)?)\b";

static CLIENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:client(?:\s+name)?|name)\s*[:\-]\s*([^,;\r\n]+)").unwrap()
});

static ADVISER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\badvi[sz](?:e|o)r(?:\s+name)?\s*[:\-]\s*([^,;\r\n]+)").unwrap()
});

static NET_WORTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bnet\s+worth\s*(?:of|is|:|-)?\s*{AMOUNT}")).unwrap()
});

static INCOME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:combined\s+|household\s+)?income\s*(?:of|is|:|-)?\s*{AMOUNT}"
    ))
    .unwrap()
});

static ISA_ALLOWANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bisa\s+allowance(?:\s+remaining)?\s*(?:of|is|:|-)?\s*{AMOUNT}"
    ))
    .unwrap()
});

static NEXT_REVIEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bnext\s+review(?:\s+date)?\s*(?:is|on|due|:|-)?\s*(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{4})",
    )
    .unwrap()
});

static URGENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*urgent\s*[:\-]\s*(.+?)\s*$").unwrap());

static GAP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:protection\s+)?gaps?\s*[:\-]\s*(.+?)\s*$").unwrap()
});

/// Build an extraction-shaped payload from labelled lines in the text,
/// without a model. Returns `None` when no client name can be found.
///
/// Only fields with an explicit label are filled; the result is meant as a
/// starting point for the advisor to review, not a full extraction.
pub fn heuristic_draft(text: &str) -> Option<Value> {
    let client_name = capture(&CLIENT_NAME, text)?;

    let mut client = Map::new();
    client.insert("client_id".into(), Value::Null);
    client.insert("client_name".into(), Value::String(client_name));
    client.insert(
        "adviser_name".into(),
        capture(&ADVISER_NAME, text).map_or(Value::Null, Value::String),
    );
    client.insert("net_worth".into(), amount(&NET_WORTH, text));
    client.insert("combined_income".into(), amount(&INCOME, text));
    client.insert("isa_allowance_remaining".into(), amount(&ISA_ALLOWANCE, text));
    client.insert(
        "next_review_date".into(),
        capture(&NEXT_REVIEW, text)
            .and_then(|raw| parse_loose_date(&raw))
            .map_or(Value::Null, |d| Value::String(d.to_string())),
    );

    let mut payload = Map::new();
    payload.insert("client".into(), Value::Object(client));

    let gaps = all_captures(&GAP_LINE, text);
    if !gaps.is_empty() {
        payload.insert("protection".into(), json!({ "gaps": gaps }));
    }
    let urgent = all_captures(&URGENT_LINE, text);
    if !urgent.is_empty() {
        payload.insert("urgent_items".into(), json!(urgent));
    }

    Some(Value::Object(payload))
}

/// Parse UK currency shorthand: `£2.85m`, `685k`, `1,250,000`, `£1.2bn`.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('£')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect::<String>()
        .to_ascii_lowercase();

    let (digits, multiplier) = [
        ("billion", 1e9),
        ("bn", 1e9),
        ("million", 1e6),
        ("m", 1e6),
        ("thousand", 1e3),
        ("k", 1e3),
    ]
    .iter()
    .find_map(|(suffix, mult)| cleaned.strip_suffix(suffix).map(|d| (d.to_string(), *mult)))
    .unwrap_or((cleaned.clone(), 1.0));

    let value: f64 = digits.parse().ok()?;
    let scaled = (value * multiplier * 100.0).round() / 100.0;
    scaled.is_finite().then_some(scaled)
}

/// ISO dates, or UK day-first `dd/mm/yyyy`.
fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_end_matches('.').trim().to_string())
        .filter(|s| !s.is_empty())
}

fn all_captures(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn amount(re: &Regex, text: &str) -> Value {
    capture(re, text)
        .and_then(|raw| parse_currency(&raw))
        .map_or(Value::Null, Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_shorthand() {
        assert_eq!(parse_currency("£2.85m"), Some(2_850_000.0));
        assert_eq!(parse_currency("685k"), Some(685_000.0));
        assert_eq!(parse_currency("£1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_currency("£ 1.2 bn"), Some(1_200_000_000.0));
        assert_eq!(parse_currency("3 million"), Some(3_000_000.0));
        assert_eq!(parse_currency("twenty"), None);
    }

    #[test]
    fn draft_from_single_line_note() {
        let draft = heuristic_draft("Client: Jane Doe, net worth £2.85m").unwrap();
        assert_eq!(draft["client"]["client_name"], "Jane Doe");
        assert_eq!(draft["client"]["net_worth"], 2_850_000.0);
        assert!(draft["client"]["client_id"].is_null());
    }

    #[test]
    fn draft_picks_up_labelled_fields() {
        let text = "Client Name: John Smith\n\
                    Adviser: Priya Patel\n\
                    Combined income: £185,000\n\
                    ISA allowance remaining: £12k\n\
                    Next review: 14/06/2025\n\
                    Gaps: No income protection\n\
                    Urgent: Pension transfer deadline Friday\n";
        let draft = heuristic_draft(text).unwrap();
        let client = &draft["client"];
        assert_eq!(client["client_name"], "John Smith");
        assert_eq!(client["adviser_name"], "Priya Patel");
        assert_eq!(client["combined_income"], 185_000.0);
        assert_eq!(client["isa_allowance_remaining"], 12_000.0);
        assert_eq!(client["next_review_date"], "2025-06-14");
        assert_eq!(draft["protection"]["gaps"][0], "No income protection");
        assert_eq!(draft["urgent_items"][0], "Pension transfer deadline Friday");
    }

    #[test]
    fn no_name_no_draft() {
        assert!(heuristic_draft("Portfolio performance was strong this quarter.").is_none());
    }

    #[test]
    fn unlabelled_amounts_stay_null() {
        let draft = heuristic_draft("Client: Ada Lovelace\nHolds about £400k in cash").unwrap();
        assert!(draft["client"]["net_worth"].is_null());
        assert!(draft.get("urgent_items").is_none());
    }
}
