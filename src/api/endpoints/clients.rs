use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{ClientDetail, ClientNote, ClientRecord};
use crate::pipeline::processor::NoteOutcome;
use crate::pipeline::structuring::{note_from_sections, MappingContext};

/// `GET /api/clients` — soonest review first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<ClientRecord>>, ApiError> {
    Ok(Json(ctx.core.store().list_clients().await?))
}

/// `GET /api/clients/:id` — the client, its sections, its latest import
/// and the matching edit form.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientDetail>, ApiError> {
    let store = ctx.core.store();
    let client = store
        .get_client(&client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client {client_id}")))?;
    let sections = store.client_sections(&client_id).await?;
    let latest_document = store.latest_parsed_document(&client_id).await?;
    let note = note_from_sections(&client, &sections);
    Ok(Json(ClientDetail {
        client,
        sections,
        latest_document,
        note,
    }))
}

/// `POST /api/clients` — create from a manual note.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(note): Json<ClientNote>,
) -> Result<(StatusCode, Json<NoteOutcome>), ApiError> {
    let outcome = ctx
        .core
        .processor()
        .create_from_note(&note, &MappingContext::now())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `PUT /api/clients/:id` — overwrite from an edited note.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(client_id): Path<String>,
    Json(note): Json<ClientNote>,
) -> Result<Json<NoteOutcome>, ApiError> {
    let outcome = ctx
        .core
        .processor()
        .update_from_note(&client_id, &note, &MappingContext::now())
        .await?;
    Ok(Json(outcome))
}
