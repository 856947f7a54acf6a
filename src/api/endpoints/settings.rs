use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Debug, Deserialize)]
pub struct LlmKeyRequest {
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct LlmKeyResponse {
    pub stored: bool,
}

/// `PUT /api/settings/llm-key` — save the advisor's key; a blank key clears it.
pub async fn set_llm_key(
    State(ctx): State<ApiContext>,
    Json(request): Json<LlmKeyRequest>,
) -> Result<Json<LlmKeyResponse>, ApiError> {
    let stored = ctx.core.set_session_key(&request.key)?;
    Ok(Json(LlmKeyResponse { stored }))
}

#[derive(Debug, Serialize)]
pub struct LlmResetResponse {
    pub was_paused: bool,
}

/// `POST /api/settings/llm-reset` — resume AI calls after the repair
/// circuit has opened.
pub async fn reset_llm(State(ctx): State<ApiContext>) -> Json<LlmResetResponse> {
    Json(LlmResetResponse {
        was_paused: ctx.core.reset_circuit(),
    })
}
