pub mod aggregates;
pub mod ingest;
pub mod profile;

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use tracing::warn;

use crate::app::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match allezon_observability::render_metrics(&state.registry) {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "failed to render metrics");
            Response::builder()
                .status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
                .body(axum::body::Body::from("metrics unavailable"))
                .expect("static response is well-formed")
        }
    }
}
