use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use prometheus::Registry;

use allezon_observability::{http_error_metrics_layer, HttpErrorMetrics};
use allezon_store::RecordStore;

use crate::handlers::{
    add, get_ordered_map, health, list_append_unique, list_get, map_put, map_remove_range, map_size, metrics, scan_all,
};

const SERVICE_NAME: &str = "store-service";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub registry: Arc<Registry>,
    pub error_metrics: HttpErrorMetrics,
}

/// The one process that owns a real `RecordStore`. `api-service`,
/// `worker-service`, and `id-interner-service` each hold an
/// `allezon_store::HttpRecordStore` pointed at this service instead of
/// constructing their own in-process store, so a write from one
/// reaches a read from another.
pub fn build_router(state: AppState) -> Router {
    let error_metrics = state.error_metrics.clone();
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/get_ordered_map", post(get_ordered_map))
        .route("/map_put", post(map_put))
        .route("/map_size", post(map_size))
        .route("/map_remove_range", post(map_remove_range))
        .route("/list_get", post(list_get))
        .route("/list_append_unique", post(list_append_unique))
        .route("/add", post(add))
        .route("/scan_all", post(scan_all))
        .with_state(state)
        .layer(middleware::from_fn(move |req, next| {
            http_error_metrics_layer(SERVICE_NAME, error_metrics.clone(), req, next)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use allezon_store::InMemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let registry = Arc::new(Registry::new());
        let error_metrics = HttpErrorMetrics::register(&registry).unwrap();
        build_router(AppState { store, registry, error_metrics })
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = app().oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_route_returns_ok() {
        let response = app().oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn add_then_scan_all_reflects_the_write() {
        let router = app();
        let add_body = serde_json::json!({"set": "aggregates", "key": "2024-01-01", "bin": "count", "delta": 3u64});
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/add")
                    .header("content-type", "application/json")
                    .body(Body::from(add_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let scan_body = serde_json::json!({"set": "aggregates", "bin": "count"});
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scan_all")
                    .header("content-type", "application/json")
                    .body(Body::from(scan_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_ordered_map_on_missing_key_is_not_found() {
        let router = app();
        let body = serde_json::json!({"set": "profiles", "key": "nope", "bin": "views"});
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/get_ordered_map")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
