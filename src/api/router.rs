//! HTTP router: the LLM proxy, health check and the pipeline API.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config::MAX_UPLOAD_BYTES;
use crate::core_state::CoreState;

/// Build the full router.
///
/// CORS is open to any origin; the service is meant to sit behind the
/// advisor's own front end on localhost or a private deployment.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route(
            "/groq",
            post(endpoints::proxy::forward).fallback(endpoints::proxy::method_not_allowed),
        )
        .route(
            "/clients",
            get(endpoints::clients::list).post(endpoints::clients::create),
        )
        .route(
            "/clients/:id",
            get(endpoints::clients::detail).put(endpoints::clients::update),
        )
        .route("/clients/:id/brief", post(endpoints::briefs::generate))
        .route(
            "/documents/parse",
            post(endpoints::documents::parse).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/documents/insert", post(endpoints::documents::insert))
        .route("/documents/resume", post(endpoints::documents::resume))
        .route("/settings/llm-key", put(endpoints::settings::set_llm_key))
        .route("/settings/llm-reset", post(endpoints::settings::reset_llm));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("No such route".into())
}
