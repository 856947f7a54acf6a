use serde_json::Value;

use super::MeetingContext;
use crate::models::{
    BriefGoal, ClientRecord, ClientSection, CriticalItem, FinancialSnapshot, GeneratedBrief,
    Insight, MeetingDetails, SectionType, TalkingPoint,
};
use crate::pipeline::structuring::{list_from_text, render_section_text};

const NOT_RECORDED: &str = "Not recorded";
const DEFAULT_LOCATION: &str = "Office";
const MAX_HEADING_WORDS: usize = 6;

// ─── Section access ───

/// Lines of one section, as the advisor would see them.
fn section_lines(sections: &[ClientSection], section_type: SectionType) -> Vec<String> {
    sections
        .iter()
        .filter(|s| s.section_type == section_type)
        .flat_map(|s| list_from_text(&render_section_text(&s.data)))
        .collect()
}

/// A named list inside an object section, e.g. `protection.gaps`.
fn section_field_list(sections: &[ClientSection], section_type: SectionType, field: &str) -> Vec<String> {
    sections
        .iter()
        .filter(|s| s.section_type == section_type)
        .filter_map(|s| s.data.get(field))
        .flat_map(|v| match v {
            Value::Array(_) | Value::String(_) => list_from_text(&render_section_text(v)),
            _ => Vec::new(),
        })
        .collect()
}

// ─── Formatting ───

/// `£2.85m`, `£685k`, `£950`.
pub fn format_gbp(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();
    if abs >= 1_000_000.0 {
        format!("{sign}£{}m", trim_decimals(abs / 1_000_000.0, 2))
    } else if abs >= 1_000.0 {
        format!("{sign}£{}k", trim_decimals(abs / 1_000.0, 1))
    } else {
        format!("{sign}£{abs:.0}")
    }
}

fn trim_decimals(value: f64, places: usize) -> String {
    let formatted = format!("{value:.places$}");
    if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        formatted
    }
}

fn amount_or_not_recorded(amount: Option<f64>) -> String {
    amount.map(format_gbp).unwrap_or_else(|| NOT_RECORDED.to_string())
}

/// "Heading: detail" splits; otherwise the first few words head the line.
fn insight_from_line(line: &str) -> Insight {
    if let Some((heading, text)) = line.split_once(": ") {
        if !heading.trim().is_empty() && !text.trim().is_empty() {
            return Insight {
                heading: heading.trim().to_string(),
                text: text.trim().to_string(),
            };
        }
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let heading = if words.len() > MAX_HEADING_WORDS {
        format!("{}…", words[..MAX_HEADING_WORDS].join(" "))
    } else {
        line.to_string()
    };
    Insight {
        heading,
        text: line.to_string(),
    }
}

fn lines_matching(lines: &[String], keywords: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| {
            let lower = line.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .cloned()
        .collect()
}

fn first_name(client_name: &str) -> &str {
    client_name.split_whitespace().next().unwrap_or(client_name)
}

// ─── Builder ───

/// Assemble a meeting brief from stored data alone.
///
/// Deterministic and infallible: missing data yields empty lists or
/// neutral text, so a client name is enough to produce a brief.
pub fn build_offline_brief(
    client: &ClientRecord,
    sections: &[ClientSection],
    meeting: &MeetingContext,
) -> GeneratedBrief {
    let goals = section_lines(sections, SectionType::Goals);
    let gaps = section_field_list(sections, SectionType::Protection, "gaps");
    let urgent = section_field_list(sections, SectionType::Other, "urgent_items");
    let financial_lines = section_lines(sections, SectionType::FinancialSummary);

    // Critical items
    let mut critical_items: Vec<CriticalItem> = urgent
        .iter()
        .map(|item| CriticalItem {
            text: item.clone(),
            urgency: "Critical".into(),
            deadline: "As soon as possible".into(),
            reason: "Flagged as urgent in the client file".into(),
        })
        .collect();
    critical_items.extend(gaps.iter().map(|gap| CriticalItem {
        text: gap.clone(),
        urgency: "High".into(),
        deadline: "Before next review".into(),
        reason: "Protection gap".into(),
    }));
    if client.review_overdue {
        let due = client
            .next_review_date
            .map(|d| format!(" (due {})", d.format("%-d %b %Y")))
            .unwrap_or_default();
        critical_items.push(CriticalItem {
            text: format!("Review overdue{due}"),
            urgency: "High".into(),
            deadline: "This meeting".into(),
            reason: "Ongoing suitability review is outstanding".into(),
        });
    }
    if let Some(isa) = client.isa_allowance_remaining.filter(|v| *v > 0.0) {
        critical_items.push(CriticalItem {
            text: format!("Use remaining ISA allowance ({})", format_gbp(isa)),
            urgency: "Medium".into(),
            deadline: "Before 5 April".into(),
            reason: "Unused allowance is lost at tax year end".into(),
        });
    }

    // Opportunities and risks
    let mut opportunities: Vec<Insight> = section_lines(sections, SectionType::Opportunities)
        .iter()
        .map(|l| insight_from_line(l))
        .collect();
    opportunities.extend(
        section_lines(sections, SectionType::Recommendations)
            .iter()
            .map(|l| Insight {
                heading: "Recommendation".into(),
                text: l.clone(),
            }),
    );

    let mut risks: Vec<Insight> = section_lines(sections, SectionType::Risks)
        .iter()
        .map(|l| insight_from_line(l))
        .collect();
    risks.extend(gaps.iter().map(|gap| Insight {
        heading: "Protection gap".into(),
        text: gap.clone(),
    }));

    // Talking points
    let first = first_name(&client.client_name);
    let mut talking_points = vec![TalkingPoint {
        topic: "Changes since we last met".into(),
        script: format!(
            "{first}, what has changed in your work, health or family since we last spoke?"
        ),
    }];
    if client.review_overdue {
        talking_points.push(TalkingPoint {
            topic: "Review cycle".into(),
            script: "Your review is overdue, so let's confirm your circumstances and objectives today.".into(),
        });
    }
    talking_points.extend(urgent.iter().map(|item| TalkingPoint {
        topic: "Urgent item".into(),
        script: format!("We flagged \"{item}\" as urgent. Can we agree the next step today?"),
    }));
    talking_points.extend(gaps.iter().map(|gap| TalkingPoint {
        topic: "Protection".into(),
        script: format!("There is a gap in your cover: {gap}. Shall we look at the options?"),
    }));
    if let Some(goal) = goals.first() {
        talking_points.push(TalkingPoint {
            topic: "Goals".into(),
            script: format!("Is \"{goal}\" still your priority, and has anything changed?"),
        });
    }

    let summary = build_summary(client, goals.len(), critical_items.len());
    let email_template = build_email(client, meeting, &critical_items);

    GeneratedBrief {
        meeting_details: MeetingDetails {
            date: meeting.display_date(),
            location: DEFAULT_LOCATION.into(),
            meeting_type: meeting.meeting_type.clone(),
        },
        summary,
        financial_snapshot: FinancialSnapshot {
            net_worth: amount_or_not_recorded(client.net_worth),
            income: amount_or_not_recorded(client.combined_income),
            assets: join_or_not_recorded(
                section_lines(sections, SectionType::Assets)
                    .into_iter()
                    .chain(section_lines(sections, SectionType::Pensions))
                    .collect(),
            ),
            liabilities: join_or_not_recorded(lines_matching(
                &financial_lines,
                &["mortgage", "loan", "debt", "liabilit"],
            )),
            risk_profile: join_or_not_recorded(lines_matching(
                &financial_lines,
                &["risk profile", "attitude to risk", "risk appetite"],
            )),
        },
        goals: goals
            .into_iter()
            .map(|text| BriefGoal {
                text,
                why: "Recorded client objective".into(),
            })
            .collect(),
        critical_items,
        opportunities,
        risks,
        talking_points,
        email_template,
    }
}

fn join_or_not_recorded(lines: Vec<String>) -> String {
    if lines.is_empty() {
        NOT_RECORDED.to_string()
    } else {
        lines.join("; ")
    }
}

fn build_summary(client: &ClientRecord, goal_count: usize, critical_count: usize) -> String {
    let adviser = client
        .adviser_name
        .as_deref()
        .map(|a| format!(", advised by {a}"))
        .unwrap_or_default();
    let review = match client.next_review_date {
        Some(date) if client.review_overdue => {
            format!("The review due {} is overdue.", date.format("%-d %b %Y"))
        }
        Some(date) => format!("Next review is due {}.", date.format("%-d %b %Y")),
        None => "No review date is scheduled.".to_string(),
    };
    format!(
        "{}{adviser} ({} client). {review} {goal_count} recorded goal(s) and {critical_count} item(s) needing attention.",
        client.client_name,
        client.status.as_str(),
    )
}

fn build_email(client: &ClientRecord, meeting: &MeetingContext, critical: &[CriticalItem]) -> String {
    let actions = if critical.is_empty() {
        "1) Confirm there are no changes to your circumstances or objectives".to_string()
    } else {
        critical
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}) {}", i + 1, item.text))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let sign_off = client.adviser_name.as_deref().unwrap_or("Your adviser");
    format!(
        "Subject: {} follow-up ({})\n\n\
         Dear {},\n\n\
         Thank you for your time today. Summary of agreed actions:\n\n\
         {actions}\n\n\
         I will follow up on each of these before our next meeting.\n\n\
         Best regards,\n{sign_off}",
        meeting.meeting_type,
        meeting.display_date(),
        first_name(&client.client_name),
    )
}
