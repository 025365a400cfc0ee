use axum::extract::State;
use axum::response::Response;
use axum::Json;

use allezon_store::wire::{
    AddRequest, GetOrderedMapRequest, GetOrderedMapResponse, ListAppendUniqueRequest, ListAppendUniqueResponse, ListGetRequest,
    ListGetResponse, MapPutRequest, MapPutResponse, MapRemoveRangeRequest, MapSizeRequest, MapSizeResponse, ScanAllRequest,
    ScanAllResponse,
};
use allezon_store::StoreError;
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

pub async fn get_ordered_map(
    State(state): State<AppState>,
    Json(request): Json<GetOrderedMapRequest>,
) -> Result<Json<GetOrderedMapResponse>, StoreError> {
    let entries = state.store.get_ordered_map(&request.set, &request.key, &request.bin).await?;
    Ok(Json(GetOrderedMapResponse { entries }))
}

pub async fn map_put(State(state): State<AppState>, Json(request): Json<MapPutRequest>) -> Result<Json<MapPutResponse>, StoreError> {
    let new_size = state
        .store
        .map_put(&request.set, &request.key, &request.bin, request.map_key, request.value)
        .await?;
    Ok(Json(MapPutResponse { new_size }))
}

pub async fn map_size(State(state): State<AppState>, Json(request): Json<MapSizeRequest>) -> Result<Json<MapSizeResponse>, StoreError> {
    let (size, generation) = state.store.map_size(&request.set, &request.key, &request.bin).await?;
    Ok(Json(MapSizeResponse { size, generation }))
}

pub async fn map_remove_range(State(state): State<AppState>, Json(request): Json<MapRemoveRangeRequest>) -> Result<(), StoreError> {
    state
        .store
        .map_remove_range(&request.set, &request.key, &request.bin, request.count, request.expected_generation)
        .await
}

pub async fn list_get(State(state): State<AppState>, Json(request): Json<ListGetRequest>) -> Result<Json<ListGetResponse>, StoreError> {
    let elements = state.store.list_get(&request.set, &request.key, &request.bin).await?;
    Ok(Json(ListGetResponse { elements }))
}

pub async fn list_append_unique(
    State(state): State<AppState>,
    Json(request): Json<ListAppendUniqueRequest>,
) -> Result<Json<ListAppendUniqueResponse>, StoreError> {
    let new_len = state
        .store
        .list_append_unique(&request.set, &request.key, &request.bin, &request.value)
        .await?;
    Ok(Json(ListAppendUniqueResponse { new_len }))
}

pub async fn add(State(state): State<AppState>, Json(request): Json<AddRequest>) -> Result<(), StoreError> {
    state.store.add(&request.set, &request.key, &request.bin, request.delta).await
}

pub async fn scan_all(State(state): State<AppState>, Json(request): Json<ScanAllRequest>) -> Result<Json<ScanAllResponse>, StoreError> {
    let rows = state.store.scan_all(&request.set, &request.bin).await?;
    Ok(Json(ScanAllResponse { rows }))
}
