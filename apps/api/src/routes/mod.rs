pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::ingest::upload::MULTIPART_OVERHEAD_BYTES;
use crate::portfolio::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = (state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES) as usize;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/credential",
            put(handlers::handle_set_credential).delete(handlers::handle_clear_credential),
        )
        // Portfolio runs
        .route(
            "/api/v1/sessions/:id/runs",
            post(handlers::handle_run).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/sessions/:id/shuffle",
            post(handlers::handle_shuffle),
        )
        .route("/api/v1/sessions/:id/preview", get(handlers::handle_preview))
        .route("/api/v1/sessions/:id/prd", get(handlers::handle_prd))
        .route("/api/v1/sessions/:id/export", get(handlers::handle_export))
        // Stateless
        .route("/api/v1/render", post(handlers::handle_render))
        .route("/api/v1/validate", post(handlers::handle_validate))
        .with_state(state)
}
