use axum::extract::{Path, Query, State};
use axum::Json;

use allezon_errors::{ApiError, ApiResult};
use allezon_store::StoreError;
use allezon_types::{MillisTimeRange, UserProfile, UserTag, SOFT_LIMIT};

use crate::app::AppState;
use crate::dto::ProfileQuery;

async fn fetch_bin(state: &AppState, cookie: &str, bin: &str, range: MillisTimeRange, limit: usize) -> ApiResult<Vec<UserTag>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let entries = match state.store.get_ordered_map("user_profiles", cookie, bin).await {
        Ok(entries) => entries,
        Err(StoreError::KeyNotFound) => return Ok(Vec::new()),
        Err(err) => return Err(ApiError::backend(err)),
    };

    let mut result = Vec::with_capacity(limit.min(entries.len()));
    for (_, bytes) in entries.iter().rev() {
        let tag: UserTag = serde_json::from_slice(bytes).map_err(ApiError::backend)?;
        if range.contains(tag.time) {
            result.push(tag);
            if result.len() >= limit {
                break;
            }
        }
    }
    Ok(result)
}

/// `POST /user_profiles/:cookie` (spec §4.2). A missing cookie is not
/// an error: it yields empty `views`/`buys` lists with a 200.
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(cookie): Path<String>,
    Query(params): Query<ProfileQuery>,
) -> ApiResult<Json<UserProfile>> {
    let range = MillisTimeRange::parse(&params.time_range).map_err(|err| ApiError::validation("bad_time_range", err.to_string()))?;

    let limit = params.limit.unwrap_or(SOFT_LIMIT);
    if limit > SOFT_LIMIT {
        return Err(ApiError::validation("bad_limit", format!("limit must be between 0 and {SOFT_LIMIT}, got {limit}")));
    }

    let views = fetch_bin(&state, &cookie, "views", range, limit).await?;
    let buys = fetch_bin(&state, &cookie, "buys", range, limit).await?;
    Ok(Json(UserProfile { cookie, views, buys }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::GcPool;
    use allezon_interner_client::{InternerClient, NullInternerClient};
    use allezon_log::{LogProducer, NullLog};
    use allezon_store::{InMemoryStore, RecordStore};
    use allezon_types::{Action, Device, ProductInfo};
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

    fn tag_at(minute_offset: i64) -> UserTag {
        let base: DateTime<Utc> = "2021-06-01T12:00:00.000Z".parse().unwrap();
        UserTag {
            time: base + chrono::Duration::minutes(minute_offset),
            cookie: "c1".into(),
            country: "PL".into(),
            origin: "o".into(),
            device: Device::Pc,
            action: Action::View,
            product_info: ProductInfo { product_id: 1, brand_id: "b".into(), category_id: "c".into(), price: 1 },
        }
    }

    #[tokio::test]
    async fn missing_cookie_returns_empty_lists_not_error() {
        let state = state();
        let range = MillisTimeRange::parse("2021-01-01T00:00:00.000_2021-01-01T01:00:00.000").unwrap();
        let views = fetch_bin(&state, "nobody", "views", range, 10).await.unwrap();
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn results_are_newest_first_and_half_open() {
        let state = state();
        for i in 0..5i64 {
            let tag = tag_at(i);
            let value = serde_json::to_vec(&tag).unwrap();
            state.store.map_put("user_profiles", "c1", "views", tag.time_ms(), value).await.unwrap();
        }
        let range = MillisTimeRange::parse("2021-06-01T12:01:00.000_2021-06-01T12:04:00.000").unwrap();
        let views = fetch_bin(&state, "c1", "views", range, 10).await.unwrap();
        let minutes: Vec<i64> = views.iter().map(|t| (t.time.timestamp() - tag_at(0).time.timestamp()) / 60).collect();
        assert_eq!(minutes, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn limit_above_soft_limit_is_rejected() {
        let state = state();
        let err = get_user_profile(
            State(state),
            Path("c1".to_string()),
            Query(ProfileQuery { time_range: "2021-01-01T00:00:00.000_2021-01-01T01:00:00.000".to_string(), limit: Some(9999) }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }
}
