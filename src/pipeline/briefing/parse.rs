use serde_json::{Map, Value};

use super::MeetingContext;
use crate::models::{
    BriefGoal, CriticalItem, FinancialSnapshot, GeneratedBrief, Insight, MeetingDetails,
    TalkingPoint,
};
use crate::pipeline::structuring::{parse_array_lenient, StructuringError};

/// Turn a repaired model reply into a brief.
///
/// Only `summary` is mandatory. List entries that do not fit their shape are
/// skipped, scalar numbers are accepted where strings are expected, and the
/// meeting type/date fall back to the request's context.
pub fn parse_brief(value: &Value, meeting: &MeetingContext) -> Result<GeneratedBrief, StructuringError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StructuringError::MalformedResponse("brief is not a JSON object".into()))?;

    let summary = text(obj, "summary");
    if summary.is_empty() {
        return Err(StructuringError::Validation("brief summary is missing".into()));
    }

    let empty = Map::new();
    let details = obj
        .get("meetingDetails")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let snapshot = obj
        .get("financialSnapshot")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let meeting_details = MeetingDetails {
        date: non_empty_or(text(details, "date"), meeting.display_date()),
        location: text(details, "location"),
        meeting_type: non_empty_or(text(details, "type"), meeting.meeting_type.clone()),
    };

    let goals: Vec<BriefGoal> = parse_array_lenient(obj.get("goals"));
    let critical_items: Vec<CriticalItem> = parse_array_lenient(obj.get("criticalItems"));
    let opportunities: Vec<Insight> = parse_array_lenient(obj.get("opportunities"));
    let risks: Vec<Insight> = parse_array_lenient(obj.get("risks"));
    let talking_points: Vec<TalkingPoint> = parse_array_lenient(obj.get("talkingPoints"));

    Ok(GeneratedBrief {
        meeting_details,
        summary,
        financial_snapshot: FinancialSnapshot {
            net_worth: text(snapshot, "netWorth"),
            income: text(snapshot, "income"),
            assets: text(snapshot, "assets"),
            liabilities: text(snapshot, "liabilities"),
            risk_profile: text(snapshot, "riskProfile"),
        },
        goals: goals.into_iter().filter(|g| !g.text.trim().is_empty()).collect(),
        critical_items: critical_items
            .into_iter()
            .filter(|c| !c.text.trim().is_empty())
            .collect(),
        opportunities: opportunities.into_iter().filter(|i| !i.text.trim().is_empty()).collect(),
        risks: risks.into_iter().filter(|i| !i.text.trim().is_empty()).collect(),
        talking_points: talking_points
            .into_iter()
            .filter(|t| !t.script.trim().is_empty())
            .collect(),
        email_template: text(obj, "emailTemplate"),
    })
}

/// String fields tolerate numbers and booleans.
fn text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn non_empty_or(value: String, fallback: String) -> String {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn meeting() -> MeetingContext {
        MeetingContext::new(Some("Annual Review"), NaiveDate::from_ymd_opt(2025, 3, 7).unwrap())
    }

    #[test]
    fn full_brief_parses() {
        let value = json!({
            "meetingDetails": { "date": "7 Mar 2025, 10:00", "location": "Office", "type": "Annual Review" },
            "summary": "Jane is planning retirement.",
            "financialSnapshot": { "netWorth": "£2.85m", "income": 185000, "assets": "ISA £240k",
                                   "liabilities": "None", "riskProfile": "Balanced" },
            "goals": [{ "text": "Retire at 60", "why": "Lifestyle" }],
            "criticalItems": [{ "text": "Use ISA allowance", "urgency": "High", "deadline": "5 April", "reason": "Lost otherwise" }],
            "opportunities": [{ "heading": "Pension", "text": "Carry forward" }],
            "risks": [{ "heading": "Market", "text": "Equity heavy" }],
            "talkingPoints": [{ "topic": "ISA", "script": "Shall we top up?" }],
            "emailTemplate": "Dear Jane"
        });
        let brief = parse_brief(&value, &meeting()).unwrap();
        assert_eq!(brief.financial_snapshot.income, "185000");
        assert_eq!(brief.goals.len(), 1);
        assert_eq!(brief.critical_items[0].urgency, "High");
        assert_eq!(brief.meeting_details.location, "Office");
        assert_eq!(brief.email_template, "Dear Jane");
    }

    #[test]
    fn missing_summary_is_validation_error() {
        let err = parse_brief(&json!({ "goals": [] }), &meeting()).unwrap_err();
        assert!(matches!(err, StructuringError::Validation(_)));
    }

    #[test]
    fn bad_list_items_skipped_and_context_filled() {
        let value = json!({
            "summary": "Short",
            "goals": ["just a string", { "text": "Real goal" }, { "why": "no text" }],
            "risks": "not a list"
        });
        let brief = parse_brief(&value, &meeting()).unwrap();
        assert_eq!(brief.goals.len(), 1);
        assert_eq!(brief.goals[0].text, "Real goal");
        assert!(brief.goals[0].why.is_empty());
        assert!(brief.risks.is_empty());
        assert_eq!(brief.meeting_details.meeting_type, "Annual Review");
        assert_eq!(brief.meeting_details.date, "7 Mar 2025");
    }

    #[test]
    fn non_object_is_malformed() {
        let err = parse_brief(&json!([1, 2]), &meeting()).unwrap_err();
        assert!(matches!(err, StructuringError::MalformedResponse(_)));
    }
}
