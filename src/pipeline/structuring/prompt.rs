use crate::pipeline::gateway::{ChatMessage, ChatRequest};

pub const EXTRACTION_TEMPERATURE: f32 = 0.2;
pub const EXTRACTION_MAX_TOKENS: u32 = 3500;

/// Top-level keys the extraction contract asks for, in schema order.
pub const EXTRACTION_KEYS: &[&str] = &[
    "client",
    "personal_details",
    "financial_summary",
    "assets",
    "pensions",
    "protection",
    "goals",
    "recommendations",
    "opportunities",
    "risks",
    "recent_changes",
    "tax_position",
    "communication_log",
    "urgent_items",
];

pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are parsing a UK financial adviser's client document.
Extract every relevant fact and return it as a single JSON object.

Return ONLY valid JSON with exactly these top-level keys:
{
  "client": {
    "client_id": "string or null",
    "client_name": "string",
    "adviser_name": "string or null",
    "combined_income": number or null,
    "net_worth": number or null,
    "last_updated": "YYYY-MM-DD or null",
    "next_review_date": "YYYY-MM-DD or null",
    "isa_allowance_remaining": number or null
  },
  "personal_details": { "text": "string", "people": [{ "name": "string", "age": number or null, "occupation": "string" }] },
  "financial_summary": { "text": "string" },
  "assets": { "text": "string", "items": ["string"] },
  "pensions": { "text": "string", "items": ["string"] },
  "protection": { "text": "string", "gaps": ["string"] },
  "goals": ["string"],
  "recommendations": ["string"],
  "opportunities": ["string"],
  "risks": ["string"],
  "recent_changes": ["string"],
  "tax_position": { "text": "string" },
  "communication_log": ["string"],
  "urgent_items": ["string"]
}

Rules:
- No markdown, no code fences, no commentary outside the JSON object.
- Numbers are plain JSON numbers: no currency symbols, no thousands separators (e.g. £2.85m becomes 2850000).
- Dates are "YYYY-MM-DD" or null.
- If the document gives no client identifier, set client_id to null.
- Use null for unknown numbers or dates.
- If a section has no content, return an empty array or empty object for it."#;

/// Build the extraction call for one document's text.
pub fn build_extraction_request(document_text: &str, model: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        temperature: EXTRACTION_TEMPERATURE,
        max_tokens: EXTRACTION_MAX_TOKENS,
        messages: vec![
            ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(document_text),
        ],
        json_mode: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_messages_system_then_user() {
        let request = build_extraction_request("Client: Jane Doe", "llama-3.3-70b-versatile");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[1].content, "Client: Jane Doe");
        assert!(request.json_mode);
        assert_eq!(request.max_tokens, 3500);
    }

    #[test]
    fn deterministic_for_same_input() {
        let a = build_extraction_request("text", "m");
        let b = build_extraction_request("text", "m");
        assert_eq!(a, b);
    }

    #[test]
    fn system_prompt_names_every_key() {
        for key in EXTRACTION_KEYS {
            assert!(
                EXTRACTION_SYSTEM_PROMPT.contains(&format!("\"{key}\"")),
                "prompt missing key {key}"
            );
        }
    }

    #[test]
    fn system_prompt_states_format_rules() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("YYYY-MM-DD"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("no thousands separators"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("ONLY valid JSON"));
    }
}
