use axum::extract::State;
use axum::response::Response;
use axum::Json;
use tracing::{error, warn};

use allezon_errors::ApiResult;

use crate::app::AppState;
use crate::resolver::ResolveError;
use crate::wire::{GetIdRequest, GetIdResponse};

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

pub async fn get_id(State(state): State<AppState>, Json(request): Json<GetIdRequest>) -> ApiResult<Json<GetIdResponse>> {
    let id = state
        .resolver
        .resolve(&request.collection_name, &request.element, request.create_missing)
        .await
        .map_err(|err| {
            error!(error = %err, collection = %request.collection_name, element = %request.element, "id resolution failed");
            allezon_errors::ApiError::backend(err)
        })?;

    Ok(Json(GetIdResponse { id }))
}
