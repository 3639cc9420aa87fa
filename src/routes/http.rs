// GET handlers: version, container listing

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::AppState;

/// GET /version: service name and version from Cargo.toml at build time.
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/containers: running containers a page can open a feed for.
pub(super) async fn containers_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.feed.containers().await {
        Ok(containers) => axum::Json(containers).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "list_containers", "container listing failed");
            (
                StatusCode::BAD_GATEWAY,
                axum::Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
