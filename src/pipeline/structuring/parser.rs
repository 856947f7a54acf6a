use serde::Deserialize;
use serde_json::Value;

use super::StructuringError;

/// Model output larger than this is rejected before scanning.
pub const MAX_REPAIR_INPUT_BYTES: usize = 512 * 1024;

/// Recover the JSON object from a model reply.
///
/// Takes everything from the first `{` to the last `}` and parses it, which
/// strips prose and markdown fences around the object. Braces inside string
/// values are not special-cased.
pub fn repair(raw: &str) -> Result<Value, StructuringError> {
    if raw.len() > MAX_REPAIR_INPUT_BYTES {
        return Err(StructuringError::MalformedResponse(format!(
            "response is {} bytes, limit is {MAX_REPAIR_INPUT_BYTES}",
            raw.len()
        )));
    }

    let start = raw.find('{');
    let end = raw.rfind('}');
    let candidate = match (start, end) {
        (Some(s), Some(e)) if e > s => &raw[s..=e],
        _ => {
            return Err(StructuringError::MalformedResponse(
                "no JSON object found in response".into(),
            ))
        }
    };

    serde_json::from_str(candidate)
        .map_err(|e| StructuringError::MalformedResponse(format!("invalid JSON: {e}")))
}

/// Parse an array leniently, skipping items that fail to deserialize.
pub fn parse_array_lenient<T: for<'de> Deserialize<'de>>(items: Option<&Value>) -> Vec<T> {
    match items.and_then(Value::as_array) {
        None => vec![],
        Some(arr) => arr
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}
