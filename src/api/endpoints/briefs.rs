use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::BriefOutcome;
use crate::pipeline::briefing::MeetingContext;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BriefRequest {
    pub meeting_type: Option<String>,
    pub date: Option<NaiveDate>,
}

/// `POST /api/clients/:id/brief` — always answers with a brief; the
/// outcome says whether it came from the model or the offline builder.
pub async fn generate(
    State(ctx): State<ApiContext>,
    Path(client_id): Path<String>,
    headers: HeaderMap,
    request: Option<Json<BriefRequest>>,
) -> Result<Json<BriefOutcome>, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let store = ctx.core.store();
    let client = store
        .get_client(&client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client {client_id}")))?;
    let sections = store.client_sections(&client_id).await?;

    let meeting = MeetingContext::new(
        request.meeting_type.as_deref(),
        request.date.unwrap_or_else(|| Utc::now().date_naive()),
    );
    let credential = ctx.credential(&headers)?;
    let outcome = ctx
        .core
        .brief_generator()
        .generate(&client, &sections, &meeting, credential.as_ref())
        .await;
    Ok(Json(outcome))
}
