use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use backoff::ExponentialBackoff;

use allezon_errors::{ApiError, ApiResult};
use allezon_store::StoreError;
use allezon_types::{Action, UserTag, GC_TRIGGER_LIMIT};

use crate::app::AppState;

fn bin_for_action(action: Action) -> &'static str {
    match action {
        Action::View => "views",
        Action::Buy => "buys",
    }
}

/// Spec §4.1's profile-append retry: initial 10ms, cap 500ms, total
/// budget 70ms (the fast inline path, distinct from the worker's
/// 1s/300s/30s aggregate-update budget).
fn profile_append_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(500),
        max_elapsed_time: Some(Duration::from_millis(70)),
        ..ExponentialBackoff::default()
    }
}

async fn append_profile(state: &AppState, tag: &UserTag) -> Result<(), StoreError> {
    let bin = bin_for_action(tag.action);
    let value = serde_json::to_vec(tag).expect("UserTag always serializes");
    let time_ms = tag.time_ms();

    let new_len = backoff::future::retry(profile_append_backoff(), || async {
        state
            .store
            .map_put("user_profiles", &tag.cookie, bin, time_ms, value.clone())
            .await
            .map_err(backoff::Error::transient)
    })
    .await?;

    if new_len > GC_TRIGGER_LIMIT {
        state.gc.trigger(tag.cookie.clone(), tag.action);
    }
    Ok(())
}

/// `POST /user_tags` (spec §4.1): launches the profile append and log
/// publish concurrently and succeeds only if both do.
pub async fn ingest_user_tag(State(state): State<AppState>, Json(tag): Json<UserTag>) -> ApiResult<StatusCode> {
    let (profile_result, log_result) = tokio::join!(append_profile(&state, &tag), state.log.publish(&tag));

    profile_result.map_err(ApiError::backend)?;
    log_result.map_err(ApiError::backend)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::GcPool;
    use allezon_interner_client::{InternerClient, NullInternerClient};
    use allezon_log::{LogProducer, NullLog};
    use allezon_store::{InMemoryStore, RecordStore};
    use allezon_types::{Device, ProductInfo};
    use chrono::{DateTime, Utc};
    use prometheus::Registry;
    use std::sync::Arc;

    fn state() -> AppState {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let registry = Arc::new(Registry::new());
        AppState {
            gc: GcPool::spawn(store.clone()),
            store,
            log: Arc::new(NullLog) as Arc<dyn LogProducer>,
            interner: Arc::new(NullInternerClient) as Arc<dyn InternerClient>,
            error_metrics: allezon_observability::HttpErrorMetrics::register(&registry).unwrap(),
            registry,
        }
    }

    fn sample_tag() -> UserTag {
        UserTag {
            time: "2021-06-01T12:00:00.000Z".parse::<DateTime<Utc>>().unwrap(),
            cookie: "c1".into(),
            country: "PL".into(),
            origin: "https://g/".into(),
            device: Device::Pc,
            action: Action::View,
            product_info: ProductInfo { product_id: 1, brand_id: "b".into(), category_id: "c".into(), price: 10 },
        }
    }

    #[tokio::test]
    async fn appends_profile_and_returns_no_content() {
        let state = state();
        let tag = sample_tag();
        let status = ingest_user_tag(State(state.clone()), Json(tag.clone())).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let entries = state.store.get_ordered_map("user_profiles", &tag.cookie, "views").await.unwrap();
        assert_eq!(entries.len(), 1);
    }
}
