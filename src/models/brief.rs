use serde::{Deserialize, Serialize};

use super::enums::Provenance;

// ─── Generated brief ───
// Field names follow the JSON contract the model is asked to produce.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedBrief {
    pub meeting_details: MeetingDetails,
    pub summary: String,
    pub financial_snapshot: FinancialSnapshot,
    pub goals: Vec<BriefGoal>,
    pub critical_items: Vec<CriticalItem>,
    pub opportunities: Vec<Insight>,
    pub risks: Vec<Insight>,
    pub talking_points: Vec<TalkingPoint>,
    pub email_template: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingDetails {
    pub date: String,
    pub location: String,
    #[serde(rename = "type")]
    pub meeting_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    pub net_worth: String,
    pub income: String,
    pub assets: String,
    pub liabilities: String,
    pub risk_profile: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefGoal {
    pub text: String,
    pub why: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalItem {
    pub text: String,
    pub urgency: String,
    pub deadline: String,
    pub reason: String,
}

/// Opportunity or risk entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insight {
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkingPoint {
    pub topic: String,
    pub script: String,
}

/// A brief plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct BriefOutcome {
    pub brief: GeneratedBrief,
    pub provenance: Provenance,
    pub model: Option<String>,
    /// Why the offline path was taken, when it was.
    pub notice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_serializes_camel_case() {
        let brief = GeneratedBrief {
            meeting_details: MeetingDetails {
                date: "1 Mar 2025".into(),
                location: "Office".into(),
                meeting_type: "Annual Review".into(),
            },
            summary: "Steady year".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&brief).unwrap();
        assert_eq!(json["meetingDetails"]["type"], "Annual Review");
        assert!(json["financialSnapshot"]["riskProfile"].is_string());
        assert!(json["talkingPoints"].as_array().unwrap().is_empty());
        assert_eq!(json["emailTemplate"], "");
    }
}
