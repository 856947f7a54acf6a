use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::MeetingContext;
use crate::models::{ClientRecord, ClientSection};
use crate::pipeline::gateway::{ChatMessage, ChatRequest};

pub const BRIEF_TEMPERATURE: f32 = 0.3;
pub const BRIEF_MAX_TOKENS: u32 = 4000;

/// Top-level keys of the brief contract.
pub const BRIEF_KEYS: &[&str] = &[
    "meetingDetails",
    "summary",
    "financialSnapshot",
    "goals",
    "criticalItems",
    "opportunities",
    "risks",
    "talkingPoints",
    "emailTemplate",
];

pub const BRIEF_SYSTEM_PROMPT: &str = "You are an assistant for UK financial advisers preparing client meetings. \
Be proactive, strategic and grounded in the client data you are given. \
Respond with strictly valid JSON matching the schema in the user message. \
Do not wrap the JSON in markdown code fences and do not add any text outside the JSON object.";

const BRIEF_SCHEMA: &str = r#"{
  "meetingDetails": { "date": "string", "location": "string", "type": "string" },
  "summary": "two sentences on the client's situation, context and key themes",
  "financialSnapshot": {
    "netWorth": "string",
    "income": "string",
    "assets": "string",
    "liabilities": "string",
    "riskProfile": "string"
  },
  "goals": [{ "text": "goal", "why": "why it matters" }],
  "criticalItems": [{ "text": "item", "urgency": "Critical/High/Medium", "deadline": "timing", "reason": "impact" }],
  "opportunities": [{ "heading": "short title", "text": "detail" }],
  "risks": [{ "heading": "short title", "text": "detail" }],
  "talkingPoints": [{ "topic": "string", "script": "suggested phrasing" }],
  "emailTemplate": "professional follow-up email summarising the meeting and actions"
}"#;

const BRIEF_RULES: &str = "Rules:
- Return ONLY valid JSON with exactly the keys above.
- Any JSON number must be a plain number: no currency symbols, no thousands separators. Formatted amounts such as \"£2.85m\" belong inside strings.
- Any calendar date you return on its own must be YYYY-MM-DD, or null when unknown.
- Use empty arrays when there is nothing to report.";

/// Client record and sections as the model sees them.
pub fn client_payload(client: &ClientRecord, sections: &[ClientSection]) -> Value {
    let sections: BTreeMap<&str, &Value> = sections
        .iter()
        .map(|s| (s.section_type.as_str(), &s.data))
        .collect();
    json!({ "client": client, "sections": sections })
}

pub fn build_brief_messages(
    client: &ClientRecord,
    sections: &[ClientSection],
    meeting: &MeetingContext,
) -> Vec<ChatMessage> {
    let client_json = serde_json::to_string_pretty(&client_payload(client, sections))
        .unwrap_or_else(|_| client_payload(client, sections).to_string());

    let user = format!(
        "CLIENT DATA:\n{client_json}\n\n\
         MEETING CONTEXT:\nType: {}\nDate: {}\n\n\
         TASK:\nPrepare a full meeting brief.\n\n\
         REQUIRED JSON OUTPUT STRUCTURE:\n{BRIEF_SCHEMA}\n\n{BRIEF_RULES}",
        meeting.meeting_type,
        meeting.display_date(),
    );

    vec![ChatMessage::system(BRIEF_SYSTEM_PROMPT), ChatMessage::user(user)]
}

pub fn build_brief_request(
    client: &ClientRecord,
    sections: &[ClientSection],
    meeting: &MeetingContext,
    model: &str,
) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        temperature: BRIEF_TEMPERATURE,
        max_tokens: BRIEF_MAX_TOKENS,
        messages: build_brief_messages(client, sections, meeting),
        json_mode: true,
    }
}
