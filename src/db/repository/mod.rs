//! Repository layer: table-scoped database operations.
//!
//! Every function takes a borrowed `Connection` so callers decide on
//! locking and transactions.

mod client;
mod parsed_document;
mod preference;
mod section;

pub use client::*;
pub use parsed_document::*;
pub use preference::*;
pub use section::*;

use chrono::NaiveDate;

use super::DatabaseError;

pub(crate) fn parse_date_column(
    column: &str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, DatabaseError> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| DatabaseError::CorruptColumn {
                column: column.into(),
                reason: format!("{s}: {e}"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn make_client(id: &str, review: Option<NaiveDate>) -> ClientRecord {
        ClientRecord {
            client_id: id.into(),
            client_name: format!("Client {id}"),
            adviser_name: Some("Sam Adviser".into()),
            combined_income: Some(185_000.0),
            net_worth: Some(2_850_000.0),
            last_updated: NaiveDate::from_ymd_opt(2025, 1, 10),
            next_review_date: review,
            isa_allowance_remaining: Some(20_000.0),
            has_protection_gaps: true,
            has_urgent_items: false,
            review_overdue: false,
            status: ClientStatus::Active,
        }
    }

    fn make_document(client_id: &str, day: u32) -> ParsedDocumentRecord {
        ParsedDocumentRecord {
            id: Uuid::new_v4(),
            client_id: client_id.into(),
            filename: format!("notes-{day}.docx"),
            file_size: Some(2048),
            raw_text: "Client: Jane Doe".into(),
            structured_json: json!({ "client": { "client_name": "Jane Doe" } }),
            parse_status: ParseStatus::Completed,
            ai_model_used: Some("llama-3.3-70b-versatile".into()),
            upload_date: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn insert_and_get_client() {
        let conn = open_memory_database().unwrap();
        let client = make_client("DOE_1234", NaiveDate::from_ymd_opt(2025, 6, 1));
        insert_client(&conn, &client).unwrap();

        let loaded = get_client(&conn, "DOE_1234").unwrap().unwrap();
        assert_eq!(loaded, client);
        assert!(get_client(&conn, "MISSING_0000").unwrap().is_none());
    }

    #[test]
    fn duplicate_client_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let client = make_client("DOE_1234", None);
        insert_client(&conn, &client).unwrap();
        let err = insert_client(&conn, &client).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn update_missing_client_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_client(&conn, &make_client("NOPE_0001", None)).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn update_client_changes_fields() {
        let conn = open_memory_database().unwrap();
        let mut client = make_client("DOE_1234", None);
        insert_client(&conn, &client).unwrap();

        client.net_worth = Some(3_000_000.0);
        client.status = ClientStatus::Inactive;
        update_client(&conn, &client).unwrap();

        let loaded = get_client(&conn, "DOE_1234").unwrap().unwrap();
        assert_eq!(loaded.net_worth, Some(3_000_000.0));
        assert_eq!(loaded.status, ClientStatus::Inactive);
    }

    #[test]
    fn list_clients_orders_by_review_with_nulls_last() {
        let conn = open_memory_database().unwrap();
        insert_client(&conn, &make_client("C_0003", None)).unwrap();
        insert_client(&conn, &make_client("B_0002", NaiveDate::from_ymd_opt(2025, 9, 1))).unwrap();
        insert_client(&conn, &make_client("A_0001", NaiveDate::from_ymd_opt(2025, 4, 1))).unwrap();

        let ids: Vec<String> = list_clients(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.client_id)
            .collect();
        assert_eq!(ids, vec!["A_0001", "B_0002", "C_0003"]);
    }

    #[test]
    fn sections_insert_and_read_in_display_order() {
        let conn = open_memory_database().unwrap();
        insert_client(&conn, &make_client("DOE_1234", None)).unwrap();

        let sections = vec![
            ClientSection {
                client_id: "DOE_1234".into(),
                section_type: SectionType::Goals,
                data: json!(["Retire at 60"]),
            },
            ClientSection {
                client_id: "DOE_1234".into(),
                section_type: SectionType::PersonalDetails,
                data: json!("Married, two children"),
            },
        ];
        insert_sections(&conn, &sections).unwrap();

        let loaded = get_sections(&conn, "DOE_1234").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].section_type, SectionType::PersonalDetails);
        assert_eq!(loaded[1].data, json!(["Retire at 60"]));
    }

    #[test]
    fn duplicate_section_insert_rejected() {
        let conn = open_memory_database().unwrap();
        insert_client(&conn, &make_client("DOE_1234", None)).unwrap();
        let section = ClientSection {
            client_id: "DOE_1234".into(),
            section_type: SectionType::Risks,
            data: json!("Concentrated equity"),
        };
        insert_sections(&conn, &[section.clone()]).unwrap();
        let err = insert_sections(&conn, &[section]).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn upsert_sections_replaces_data() {
        let conn = open_memory_database().unwrap();
        insert_client(&conn, &make_client("DOE_1234", None)).unwrap();
        let mut section = ClientSection {
            client_id: "DOE_1234".into(),
            section_type: SectionType::Protection,
            data: json!({ "gaps": ["No income protection"] }),
        };
        upsert_sections(&conn, &[section.clone()]).unwrap();
        section.data = json!({ "gaps": [] });
        upsert_sections(&conn, &[section]).unwrap();

        let loaded = get_sections(&conn, "DOE_1234").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].data, json!({ "gaps": [] }));
    }

    #[test]
    fn sections_for_unknown_client_violate_foreign_key() {
        let conn = open_memory_database().unwrap();
        let err = insert_sections(
            &conn,
            &[ClientSection {
                client_id: "GHOST_0000".into(),
                section_type: SectionType::Other,
                data: json!("x"),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn latest_parsed_document_by_upload_date() {
        let conn = open_memory_database().unwrap();
        insert_client(&conn, &make_client("DOE_1234", None)).unwrap();
        let older = make_document("DOE_1234", 1);
        let newer = make_document("DOE_1234", 15);
        insert_parsed_document(&conn, &newer).unwrap();
        insert_parsed_document(&conn, &older).unwrap();

        let latest = get_latest_parsed_document(&conn, "DOE_1234").unwrap().unwrap();
        assert_eq!(latest, newer);
        assert!(get_latest_parsed_document(&conn, "OTHER_0001").unwrap().is_none());
    }

    #[test]
    fn preference_upsert_and_delete() {
        let conn = open_memory_database().unwrap();
        assert!(get_user_preference(&conn, "llm_session_key").unwrap().is_none());
        set_user_preference(&conn, "llm_session_key", "gsk_one").unwrap();
        set_user_preference(&conn, "llm_session_key", "gsk_two").unwrap();
        assert_eq!(
            get_user_preference(&conn, "llm_session_key").unwrap().as_deref(),
            Some("gsk_two")
        );
        delete_user_preference(&conn, "llm_session_key").unwrap();
        assert!(get_user_preference(&conn, "llm_session_key").unwrap().is_none());
    }
}
