//! Document import endpoints.
//!
//! `parse` returns a preview without writing anything; the client shows it
//! to the advisor and posts it back to `insert`. A `PARTIAL_WRITE` error
//! carries the outstanding writes, which `resume` replays.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::processor::{DocumentPreview, ImportOutcome, PendingWrites};
use crate::pipeline::structuring::MappingContext;

const FILE_FIELD: &str = "file";

/// `POST /api/documents/parse` — multipart upload with a `file` field.
pub async fn parse(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<DocumentPreview>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest(format!("Missing `{FILE_FIELD}` field")))?;
    tracing::info!(filename = %filename, size = bytes.len(), "Document received");

    let credential = ctx.credential(&headers)?;
    let preview = ctx
        .core
        .processor()
        .parse_document(&bytes, &filename, credential.as_ref())
        .await?;
    Ok(Json(preview))
}

/// `POST /api/documents/insert` — persist a reviewed preview.
pub async fn insert(
    State(ctx): State<ApiContext>,
    Json(preview): Json<DocumentPreview>,
) -> Result<(StatusCode, Json<ImportOutcome>), ApiError> {
    let outcome = ctx
        .core
        .processor()
        .insert_preview(&preview, &MappingContext::now())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `POST /api/documents/resume` — finish writes left by a partial import.
pub async fn resume(
    State(ctx): State<ApiContext>,
    Json(pending): Json<PendingWrites>,
) -> Result<Json<ImportOutcome>, ApiError> {
    let outcome = ctx.core.processor().resume(pending).await?;
    Ok(Json(outcome))
}
