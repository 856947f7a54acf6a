use std::sync::Arc;

use tracing::Instrument;

use super::{build_brief_request, build_offline_brief, parse_brief, MeetingContext};
use crate::models::{BriefOutcome, ClientRecord, ClientSection, Provenance};
use crate::pipeline::gateway::{ApiKey, LlmGateway};
use crate::pipeline::structuring::{repair, RepairCircuit, StructuringError};

pub const CIRCUIT_OPEN_NOTICE: &str =
    "AI generation is paused after repeated malformed responses; saving a new key or resetting AI in settings resumes it. Showing an offline brief.";

/// Brief generation with a guaranteed result.
pub struct BriefGenerator {
    gateway: Arc<dyn LlmGateway>,
    circuit: Arc<RepairCircuit>,
    model: String,
}

impl BriefGenerator {
    pub fn new(gateway: Arc<dyn LlmGateway>, circuit: Arc<RepairCircuit>, model: &str) -> Self {
        Self {
            gateway,
            circuit,
            model: model.to_string(),
        }
    }

    /// Ask the model for a brief; on any failure build one offline and say why.
    pub async fn generate(
        &self,
        client: &ClientRecord,
        sections: &[ClientSection],
        meeting: &MeetingContext,
        credential: Option<&ApiKey>,
    ) -> BriefOutcome {
        let span = tracing::info_span!("generate_brief", client_id = %client.client_id);
        self.generate_inner(client, sections, meeting, credential)
            .instrument(span)
            .await
    }

    async fn generate_inner(
        &self,
        client: &ClientRecord,
        sections: &[ClientSection],
        meeting: &MeetingContext,
        credential: Option<&ApiKey>,
    ) -> BriefOutcome {
        if self.circuit.is_open() {
            tracing::info!("Repair circuit open, using offline brief");
            return self.offline(client, sections, meeting, CIRCUIT_OPEN_NOTICE.to_string());
        }

        let request = build_brief_request(client, sections, meeting, &self.model);
        let raw = match self.gateway.invoke(&request, credential).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Brief generation failed at gateway");
                return self.offline(client, sections, meeting, e.notice());
            }
        };

        match repair(&raw).and_then(|value| parse_brief(&value, meeting)) {
            Ok(brief) => {
                self.circuit.record_success();
                tracing::info!(
                    goals = brief.goals.len(),
                    critical_items = brief.critical_items.len(),
                    "Brief generated"
                );
                BriefOutcome {
                    brief,
                    provenance: Provenance::AiGenerated,
                    model: Some(self.model.clone()),
                    notice: None,
                }
            }
            Err(e) => {
                self.circuit.record_failure();
                tracing::warn!(error = %e, "Model reply violated the brief contract");
                let notice = match e {
                    StructuringError::MalformedResponse(_) => {
                        "The AI reply could not be read as a brief.".to_string()
                    }
                    StructuringError::Validation(msg) => format!("The AI reply was incomplete: {msg}."),
                };
                self.offline(client, sections, meeting, notice)
            }
        }
    }

    fn offline(
        &self,
        client: &ClientRecord,
        sections: &[ClientSection],
        meeting: &MeetingContext,
        reason: String,
    ) -> BriefOutcome {
        BriefOutcome {
            brief: build_offline_brief(client, sections, meeting),
            provenance: Provenance::Offline,
            model: None,
            notice: Some(format!("{reason} Switched to offline mode.")),
        }
    }
}
