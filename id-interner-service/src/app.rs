use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use prometheus::Registry;

use allezon_observability::{http_error_metrics_layer, HttpErrorMetrics};

use crate::handlers::{get_id, health, metrics};
use crate::resolver::IdResolver;

const SERVICE_NAME: &str = "id-interner-service";

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<IdResolver>,
    pub registry: Arc<Registry>,
    pub error_metrics: HttpErrorMetrics,
}

pub fn build_router(state: AppState) -> Router {
    let error_metrics = state.error_metrics.clone();
    Router::new()
        .route("/health", get(health))
        .route("/get_id", post(get_id))
        .route("/metrics", get(metrics))
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
        let resolver = Arc::new(IdResolver::new(Arc::new(InMemoryStore::new())));
        let registry = Arc::new(Registry::new());
        let error_metrics = HttpErrorMetrics::register(&registry).unwrap();
        build_router(AppState { resolver, registry, error_metrics })
    }

    #[tokio::test]
    async fn metrics_route_returns_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_id_creates_and_returns_stable_id() {
        let router = app();
        let body = serde_json::json!({
            "collection_name": "brand",
            "element": "nike",
            "create_missing": true,
        });
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/get_id")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
