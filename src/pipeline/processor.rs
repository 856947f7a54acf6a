//! Document import and manual client entry.
//!
//! Import runs in two steps so the advisor can review what was read:
//! `parse_document` turns an upload into a [`DocumentPreview`] (model
//! extraction, or a heuristic draft when the model is unavailable), and
//! `insert_preview` maps and persists it. The store has no cross-entity
//! transaction, so a failure after the client row lands is reported as
//! [`ImportError::PartialWrite`] with the writes still outstanding.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::models::{ClientNote, ClientRecord, ClientSection, ParseStatus, ParsedDocumentRecord, Provenance};
use crate::pipeline::extraction::{extract_text, ExtractedText, ExtractionError};
use crate::pipeline::gateway::{ApiKey, GatewayError, LlmGateway};
use crate::pipeline::storage::{ClientStore, StorageError};
use crate::pipeline::structuring::{
    build_extraction_request, heuristic_draft, map_extraction, map_note, repair, MappingContext,
    RepairCircuit, StructuringError,
};

// ─── Errors ───

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Structuring failed: {0}")]
    Structuring(#[from] StructuringError),

    #[error("AI extraction is paused after repeated malformed responses")]
    CircuitOpen,

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The client row exists; the writes in `pending` did not land.
    #[error("Client {client_id} was saved but related records were not: {source}")]
    PartialWrite {
        client_id: String,
        pending: Box<PendingWrites>,
        #[source]
        source: StorageError,
    },
}

impl ImportError {
    /// Advisor-facing reason for taking the offline path.
    fn fallback_reason(&self) -> String {
        match self {
            ImportError::Gateway(e) => e.notice(),
            ImportError::CircuitOpen => {
                "AI extraction is paused after repeated malformed responses; saving a new key or resetting AI in settings resumes it.".to_string()
            }
            ImportError::Structuring(StructuringError::MalformedResponse(_)) => {
                "The AI reply could not be read.".to_string()
            }
            ImportError::Structuring(StructuringError::Validation(msg)) => {
                format!("The AI reply was incomplete: {msg}.")
            }
            other => other.to_string(),
        }
    }
}

// ─── Result types ───

/// What was read from an upload, before anything is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPreview {
    /// Extraction-shaped payload; the advisor may edit it before insert.
    pub payload: Value,
    pub raw_text: String,
    pub filename: String,
    pub file_size: u64,
    pub provenance: Provenance,
    pub model: Option<String>,
    pub notice: Option<String>,
}

/// Writes still owed for a client whose row already exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingWrites {
    pub client_id: String,
    pub provenance: Option<Provenance>,
    pub sections: Vec<ClientSection>,
    pub document: Option<ParsedDocumentRecord>,
}

impl PendingWrites {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.document.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub client_id: String,
    pub sections_written: usize,
    pub document_id: Option<Uuid>,
    pub provenance: Option<Provenance>,
}

/// Result of saving a manual note.
#[derive(Debug, Clone, Serialize)]
pub struct NoteOutcome {
    pub client: ClientRecord,
    pub sections_written: usize,
}

// ─── Processor ───

pub struct DocumentProcessor {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn ClientStore>,
    circuit: Arc<RepairCircuit>,
    model: String,
}

impl DocumentProcessor {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn ClientStore>,
        circuit: Arc<RepairCircuit>,
        model: &str,
    ) -> Self {
        Self {
            gateway,
            store,
            circuit,
            model: model.to_string(),
        }
    }

    /// Read an upload and build a preview.
    ///
    /// Extraction errors are returned as-is. Gateway failures, malformed or
    /// incomplete replies and an open repair circuit fall back to a
    /// heuristic draft; if that finds no client name either, the original
    /// failure is returned.
    pub async fn parse_document(
        &self,
        bytes: &[u8],
        filename: &str,
        credential: Option<&ApiKey>,
    ) -> Result<DocumentPreview, ImportError> {
        let span = tracing::info_span!("parse_document", filename = %filename, size = bytes.len());
        self.parse_inner(bytes, filename, credential)
            .instrument(span)
            .await
    }

    async fn parse_inner(
        &self,
        bytes: &[u8],
        filename: &str,
        credential: Option<&ApiKey>,
    ) -> Result<DocumentPreview, ImportError> {
        let extracted = extract_text(bytes, filename)?;
        tracing::debug!(chars = extracted.char_count, "Text extracted");

        let preview = |payload, provenance, model, notice| DocumentPreview {
            payload,
            raw_text: extracted.text.clone(),
            filename: filename.to_string(),
            file_size: bytes.len() as u64,
            provenance,
            model,
            notice,
        };

        let failure = match self.extract_with_model(&extracted, credential).await {
            Ok(payload) => {
                tracing::info!("Document structured by model");
                return Ok(preview(
                    payload,
                    Provenance::AiGenerated,
                    Some(self.model.clone()),
                    None,
                ));
            }
            Err(e) => e,
        };

        match heuristic_draft(&extracted.text) {
            Some(payload) => {
                tracing::warn!(error = %failure, "Model extraction failed, using heuristic draft");
                let notice = format!(
                    "{} Drafted from the document text in offline mode; review before saving.",
                    failure.fallback_reason()
                );
                Ok(preview(payload, Provenance::Offline, None, Some(notice)))
            }
            None => {
                tracing::warn!(error = %failure, "Model extraction failed and no client name found");
                Err(failure)
            }
        }
    }

    async fn extract_with_model(
        &self,
        extracted: &ExtractedText,
        credential: Option<&ApiKey>,
    ) -> Result<Value, ImportError> {
        if self.circuit.is_open() {
            return Err(ImportError::CircuitOpen);
        }

        let request = build_extraction_request(extracted.prompt_text(), &self.model);
        let raw = self.gateway.invoke(&request, credential).await?;

        let checked = repair(&raw).and_then(|payload| {
            let has_name = payload
                .pointer("/client/client_name")
                .and_then(Value::as_str)
                .is_some_and(|name| !name.trim().is_empty());
            if has_name {
                Ok(payload)
            } else {
                Err(StructuringError::Validation("client.client_name is required".into()))
            }
        });

        match checked {
            Ok(payload) => {
                self.circuit.record_success();
                Ok(payload)
            }
            Err(e) => {
                if self.circuit.record_failure() {
                    tracing::warn!(
                        failures = self.circuit.failures(),
                        "Repair circuit opened, model will be skipped"
                    );
                }
                Err(e.into())
            }
        }
    }

    /// Map a reviewed preview and persist the client, its sections and the
    /// import record.
    pub async fn insert_preview(
        &self,
        preview: &DocumentPreview,
        ctx: &MappingContext,
    ) -> Result<ImportOutcome, ImportError> {
        let (client, sections) = map_extraction(&preview.payload, ctx)?;
        let span = tracing::info_span!("insert_preview", client_id = %client.client_id);
        self.insert_mapped(preview, client, sections)
            .instrument(span)
            .await
    }

    async fn insert_mapped(
        &self,
        preview: &DocumentPreview,
        client: ClientRecord,
        sections: Vec<ClientSection>,
    ) -> Result<ImportOutcome, ImportError> {
        let document = ParsedDocumentRecord {
            id: Uuid::new_v4(),
            client_id: client.client_id.clone(),
            filename: preview.filename.clone(),
            file_size: Some(preview.file_size),
            raw_text: preview.raw_text.clone(),
            structured_json: preview.payload.clone(),
            parse_status: match preview.provenance {
                Provenance::AiGenerated => ParseStatus::Completed,
                Provenance::Offline => ParseStatus::Failed,
            },
            ai_model_used: match preview.provenance {
                Provenance::AiGenerated => preview.model.clone(),
                Provenance::Offline => None,
            },
            upload_date: Utc::now(),
        };

        self.store.insert_client(&client).await?;
        tracing::info!(backend = self.store.backend(), "Client inserted");

        let pending = PendingWrites {
            client_id: client.client_id,
            provenance: Some(preview.provenance),
            sections,
            document: Some(document),
        };
        self.write_pending(pending, false).await
    }

    /// Retry writes left over from a [`ImportError::PartialWrite`].
    /// Sections are upserted, so repeating a resume is harmless.
    pub async fn resume(&self, pending: PendingWrites) -> Result<ImportOutcome, ImportError> {
        if self.store.get_client(&pending.client_id).await?.is_none() {
            return Err(StorageError::NotFound(format!("Client {}", pending.client_id)).into());
        }
        tracing::info!(client_id = %pending.client_id, "Resuming pending writes");
        self.write_pending(pending, true).await
    }

    async fn write_pending(
        &self,
        mut pending: PendingWrites,
        upsert: bool,
    ) -> Result<ImportOutcome, ImportError> {
        let sections_written = pending.sections.len();
        if !pending.sections.is_empty() {
            let written = if upsert {
                self.store.upsert_sections(&pending.sections).await
            } else {
                self.store.insert_sections(&pending.sections).await
            };
            if let Err(e) = written {
                return Err(partial(pending, e));
            }
            pending.sections.clear();
        }

        let mut document_id = None;
        if let Some(document) = pending.document.take() {
            if let Err(e) = self.store.insert_parsed_document(&document).await {
                pending.document = Some(document);
                return Err(partial(pending, e));
            }
            document_id = Some(document.id);
        }

        tracing::info!(
            client_id = %pending.client_id,
            sections = sections_written,
            "Client writes complete"
        );
        Ok(ImportOutcome {
            client_id: pending.client_id,
            sections_written,
            document_id,
            provenance: pending.provenance,
        })
    }

    // ─── Manual entry ───

    /// Create a client from a manual note.
    pub async fn create_from_note(
        &self,
        note: &ClientNote,
        ctx: &MappingContext,
    ) -> Result<NoteOutcome, ImportError> {
        let (client, sections) = map_note(note, ctx)?;
        self.store.insert_client(&client).await?;
        tracing::info!(client_id = %client.client_id, "Client created from note");

        let sections_written = sections.len();
        let pending = PendingWrites {
            client_id: client.client_id.clone(),
            provenance: None,
            sections,
            document: None,
        };
        self.write_pending(pending, false).await?;
        Ok(NoteOutcome {
            client,
            sections_written,
        })
    }

    /// Overwrite an existing client from an edited note. The identifier in
    /// the path wins over any identifier in the note.
    pub async fn update_from_note(
        &self,
        client_id: &str,
        note: &ClientNote,
        ctx: &MappingContext,
    ) -> Result<NoteOutcome, ImportError> {
        let note = ClientNote {
            client_id: Some(client_id.to_string()),
            ..note.clone()
        };
        let (client, sections) = map_note(&note, ctx)?;
        self.store.update_client(&client).await?;
        tracing::info!(client_id = %client.client_id, "Client updated from note");

        let sections_written = sections.len();
        let pending = PendingWrites {
            client_id: client.client_id.clone(),
            provenance: None,
            sections,
            document: None,
        };
        self.write_pending(pending, true).await?;
        Ok(NoteOutcome {
            client,
            sections_written,
        })
    }
}

fn partial(pending: PendingWrites, source: StorageError) -> ImportError {
    tracing::error!(
        client_id = %pending.client_id,
        pending_sections = pending.sections.len(),
        pending_document = pending.document.is_some(),
        error = %source,
        "Partial write"
    );
    ImportError::PartialWrite {
        client_id: pending.client_id.clone(),
        pending: Box::new(pending),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SectionType, ClientStatus};
    use crate::pipeline::extraction::docx::tests::build_docx;
    use crate::pipeline::gateway::MockGateway;
    use crate::pipeline::storage::SqliteStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    const JANE_REPLY: &str = r#"{"client":{"client_name":"Jane Doe","net_worth":2850000}}"#;

    fn ctx() -> MappingContext {
        MappingContext {
            today: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            now_millis: 1_717_200_004_321,
        }
    }

    fn processor(gateway: MockGateway) -> (DocumentProcessor, Arc<MockGateway>, Arc<SqliteStore>, Arc<RepairCircuit>) {
        let gateway = Arc::new(gateway);
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let circuit = Arc::new(RepairCircuit::default());
        let processor = DocumentProcessor::new(
            gateway.clone(),
            store.clone(),
            circuit.clone(),
            "test-model",
        );
        (processor, gateway, store, circuit)
    }

    #[tokio::test]
    async fn docx_import_end_to_end() {
        let (processor, gateway, store, _) = processor(MockGateway::replying(JANE_REPLY));
        let bytes = build_docx(&["Client: Jane Doe, net worth £2.85m"]);

        let preview = processor.parse_document(&bytes, "doe.docx", None).await.unwrap();
        assert_eq!(preview.provenance, Provenance::AiGenerated);
        assert_eq!(preview.model.as_deref(), Some("test-model"));
        assert!(preview.notice.is_none());
        assert!(gateway.requests()[0].0.messages[1].content.contains("Jane Doe"));

        let outcome = processor.insert_preview(&preview, &MappingContext::now()).await.unwrap();
        assert!(outcome.client_id.starts_with("DOE_"));
        assert_eq!(outcome.client_id.len(), "DOE_".len() + 4);

        let client = store.get_client(&outcome.client_id).await.unwrap().unwrap();
        assert_eq!(client.client_name, "Jane Doe");
        assert_eq!(client.net_worth, Some(2_850_000.0));

        let doc = store
            .latest_parsed_document(&outcome.client_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Some(doc.id), outcome.document_id);
        assert_eq!(doc.parse_status, ParseStatus::Completed);
        assert_eq!(doc.ai_model_used.as_deref(), Some("test-model"));
    }

    #[tokio::test]
    async fn gateway_failure_falls_back_to_heuristic_draft() {
        let (processor, _, store, _) = processor(MockGateway::failing(GatewayError::Timeout {
            after: Duration::from_secs(30),
        }));
        let text = "Client: Jane Doe\nNet worth £2.85m\nUrgent: Renew term cover\n";

        let preview = processor
            .parse_document(text.as_bytes(), "notes.txt", None)
            .await
            .unwrap();
        assert_eq!(preview.provenance, Provenance::Offline);
        assert!(preview.model.is_none());
        let notice = preview.notice.clone().unwrap();
        assert!(notice.contains("30s"));
        assert!(notice.contains("offline mode"));
        assert_eq!(preview.payload["client"]["client_name"], "Jane Doe");

        let outcome = processor.insert_preview(&preview, &ctx()).await.unwrap();
        assert_eq!(outcome.client_id, "DOE_4321");
        assert_eq!(outcome.provenance, Some(Provenance::Offline));

        let client = store.get_client("DOE_4321").await.unwrap().unwrap();
        assert_eq!(client.net_worth, Some(2_850_000.0));
        assert!(client.has_urgent_items);

        let doc = store.latest_parsed_document("DOE_4321").await.unwrap().unwrap();
        assert_eq!(doc.parse_status, ParseStatus::Failed);
        assert!(doc.ai_model_used.is_none());
    }

    #[tokio::test]
    async fn malformed_reply_without_name_in_text_is_returned() {
        let (processor, _, _, circuit) = processor(MockGateway::replying("Sorry, I cannot help."));
        let text = "Meeting notes about pensions and ISAs for next year.";

        let err = processor
            .parse_document(text.as_bytes(), "notes.txt", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Structuring(StructuringError::MalformedResponse(_))
        ));
        assert_eq!(circuit.failures(), 1);
    }

    #[tokio::test]
    async fn reply_without_client_name_counts_as_failure() {
        let (processor, _, _, circuit) = processor(MockGateway::replying(r#"{"client":{}}"#));
        let text = "Client: Jane Doe\nAdviser: Sam Adviser\n";

        let preview = processor
            .parse_document(text.as_bytes(), "notes.txt", None)
            .await
            .unwrap();
        assert_eq!(preview.provenance, Provenance::Offline);
        assert!(preview.notice.unwrap().contains("incomplete"));
        assert_eq!(circuit.failures(), 1);
    }

    #[tokio::test]
    async fn open_circuit_skips_the_model() {
        let (processor, gateway, _, circuit) = processor(MockGateway::replying(JANE_REPLY));
        for _ in 0..3 {
            circuit.record_failure();
        }
        let text = "Client: Jane Doe\nNet worth 685k\n";

        let preview = processor
            .parse_document(text.as_bytes(), "notes.txt", None)
            .await
            .unwrap();
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(preview.provenance, Provenance::Offline);
        assert!(preview.notice.unwrap().contains("paused"));
    }

    #[tokio::test]
    async fn successful_repair_resets_failure_count() {
        let (processor, _, _, circuit) = processor(MockGateway::replying(JANE_REPLY));
        circuit.record_failure();
        circuit.record_failure();
        let bytes = build_docx(&["Client: Jane Doe, net worth £2.85m"]);
        processor.parse_document(&bytes, "doe.docx", None).await.unwrap();
        assert_eq!(circuit.failures(), 0);
    }

    #[tokio::test]
    async fn extraction_errors_are_not_masked() {
        let (processor, gateway, _, _) = processor(MockGateway::replying(JANE_REPLY));
        let err = processor
            .parse_document(b"too short", "notes.txt", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Extraction(ExtractionError::TooShort { .. })));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn preview_without_client_name_is_rejected_before_writing() {
        let (processor, _, store, _) = processor(MockGateway::new());
        let preview = DocumentPreview {
            payload: serde_json::json!({"client": {"net_worth": 10}}),
            raw_text: String::new(),
            filename: "x.docx".into(),
            file_size: 0,
            provenance: Provenance::AiGenerated,
            model: None,
            notice: None,
        };
        let err = processor.insert_preview(&preview, &ctx()).await.unwrap_err();
        assert!(matches!(err, ImportError::Structuring(StructuringError::Validation(_))));
        assert!(store.list_clients().await.unwrap().is_empty());
    }

    /// Delegates to SQLite but fails the first parsed-document insert.
    struct FlakyStore {
        inner: SqliteStore,
        fail_document: AtomicBool,
    }

    #[async_trait]
    impl ClientStore for FlakyStore {
        fn backend(&self) -> &'static str {
            "flaky"
        }
        async fn insert_client(&self, client: &ClientRecord) -> Result<(), StorageError> {
            self.inner.insert_client(client).await
        }
        async fn update_client(&self, client: &ClientRecord) -> Result<(), StorageError> {
            self.inner.update_client(client).await
        }
        async fn insert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError> {
            self.inner.insert_sections(sections).await
        }
        async fn upsert_sections(&self, sections: &[ClientSection]) -> Result<(), StorageError> {
            self.inner.upsert_sections(sections).await
        }
        async fn insert_parsed_document(&self, doc: &ParsedDocumentRecord) -> Result<(), StorageError> {
            if self.fail_document.swap(false, Ordering::SeqCst) {
                return Err(StorageError::Connection("connection reset".into()));
            }
            self.inner.insert_parsed_document(doc).await
        }
        async fn list_clients(&self) -> Result<Vec<ClientRecord>, StorageError> {
            self.inner.list_clients().await
        }
        async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, StorageError> {
            self.inner.get_client(client_id).await
        }
        async fn client_sections(&self, client_id: &str) -> Result<Vec<ClientSection>, StorageError> {
            self.inner.client_sections(client_id).await
        }
        async fn latest_parsed_document(
            &self,
            client_id: &str,
        ) -> Result<Option<ParsedDocumentRecord>, StorageError> {
            self.inner.latest_parsed_document(client_id).await
        }
    }

    #[tokio::test]
    async fn partial_write_can_be_resumed() {
        let store = Arc::new(FlakyStore {
            inner: SqliteStore::open_in_memory().unwrap(),
            fail_document: AtomicBool::new(true),
        });
        let processor = DocumentProcessor::new(
            Arc::new(MockGateway::new()),
            store.clone(),
            Arc::new(RepairCircuit::default()),
            "test-model",
        );
        let preview = DocumentPreview {
            payload: serde_json::json!({
                "client": {"client_name": "Jane Doe"},
                "goals": ["Retire at 60"]
            }),
            raw_text: "Client: Jane Doe".into(),
            filename: "doe.docx".into(),
            file_size: 42,
            provenance: Provenance::AiGenerated,
            model: Some("test-model".into()),
            notice: None,
        };

        let err = processor.insert_preview(&preview, &ctx()).await.unwrap_err();
        let pending = match err {
            ImportError::PartialWrite {
                client_id, pending, ..
            } => {
                assert_eq!(client_id, "DOE_4321");
                pending
            }
            other => panic!("expected partial write, got {other:?}"),
        };
        assert!(pending.sections.is_empty());
        assert!(pending.document.is_some());
        assert_eq!(store.client_sections("DOE_4321").await.unwrap().len(), 1);

        let outcome = processor.resume(*pending).await.unwrap();
        assert!(outcome.document_id.is_some());
        assert!(store.latest_parsed_document("DOE_4321").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn resume_for_unknown_client_fails() {
        let (processor, _, _, _) = processor(MockGateway::new());
        let pending = PendingWrites {
            client_id: "GHOST_0001".into(),
            provenance: None,
            sections: Vec::new(),
            document: None,
        };
        let err = processor.resume(pending).await.unwrap_err();
        assert!(matches!(err, ImportError::Storage(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn note_create_then_edit() {
        let (processor, _, store, _) = processor(MockGateway::new());
        let mut note = ClientNote {
            client_name: "Jane Doe".into(),
            net_worth: Some(1_000_000.0),
            protection_gaps: "No income protection".into(),
            ..Default::default()
        };
        note.sections.insert(SectionType::Goals, "Retire at 60".into());

        let created = processor.create_from_note(&note, &ctx()).await.unwrap();
        assert_eq!(created.client.client_id, "DOE_4321");
        assert!(created.client.has_protection_gaps);
        assert_eq!(created.sections_written, 2);

        let mut edited = note.clone();
        edited.net_worth = Some(1_250_000.0);
        edited.protection_gaps.clear();
        edited.status = Some(ClientStatus::Inactive);
        edited.sections.insert(SectionType::Goals, "Retire at 58\nGift to children".into());

        let updated = processor
            .update_from_note("DOE_4321", &edited, &ctx())
            .await
            .unwrap();
        assert!(!updated.client.has_protection_gaps);

        let client = store.get_client("DOE_4321").await.unwrap().unwrap();
        assert_eq!(client.net_worth, Some(1_250_000.0));
        assert_eq!(client.status, ClientStatus::Inactive);

        let goals = store
            .client_sections("DOE_4321")
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.section_type == SectionType::Goals)
            .unwrap();
        assert_eq!(goals.data, serde_json::json!(["Retire at 58", "Gift to children"]));
    }

    #[tokio::test]
    async fn edit_of_unknown_client_is_not_found() {
        let (processor, _, _, _) = processor(MockGateway::new());
        let note = ClientNote {
            client_name: "Nobody Here".into(),
            ..Default::default()
        };
        let err = processor
            .update_from_note("GHOST_0001", &note, &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Storage(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn note_without_name_is_rejected() {
        let (processor, _, _, _) = processor(MockGateway::new());
        let err = processor
            .create_from_note(&ClientNote::default(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Structuring(StructuringError::Validation(_))));
    }
}
