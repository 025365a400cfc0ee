use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use prometheus::Registry;
use tower_http::cors::CorsLayer;

use allezon_interner_client::InternerClient;
use allezon_log::LogProducer;
use allezon_observability::{http_error_metrics_layer, HttpErrorMetrics};
use allezon_store::RecordStore;

use crate::gc::GcPool;
use crate::handlers::{aggregates, health, ingest, metrics, profile};
use crate::validator::validate_expectations;

const SERVICE_NAME: &str = "api-service";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub log: Arc<dyn LogProducer>,
    pub interner: Arc<dyn InternerClient>,
    pub gc: GcPool,
    pub registry: Arc<Registry>,
    pub error_metrics: HttpErrorMetrics,
}

pub fn build_router(state: AppState) -> Router {
    let error_metrics = state.error_metrics.clone();

    let validated = Router::new()
        .route("/user_profiles/:cookie", post(profile::get_user_profile))
        .route("/aggregates", post(aggregates::query_aggregates))
        .layer(middleware::from_fn(validate_expectations));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/user_tags", post(ingest::ingest_user_tag))
        .merge(validated)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(move |req, next| {
            http_error_metrics_layer(SERVICE_NAME, error_metrics.clone(), req, next)
        }))
}
