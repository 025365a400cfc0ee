use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use allezon_errors::{ApiError, ApiResult};
use allezon_interner_client::{get_u16_id, BRAND_COLLECTION, CATEGORY_COLLECTION, ORIGIN_COLLECTION};
use allezon_types::{Action, AggregateKey, ActionAggregate, MinuteTimeRange};

use crate::app::AppState;
use crate::dto::{AggregateKind, AggregatesQuery};

#[derive(Debug, Serialize)]
pub struct AggregatesResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

struct FilterIds {
    origin: Option<Option<u16>>,
    brand_id: Option<Option<u16>>,
    category_id: Option<Option<u16>>,
}

/// Resolves each present filter string to its dense id without
/// creating new entries. An unresolvable (not-yet-interned) value is
/// not an error here: spec §4.3 says such a filter "matches nothing",
/// so it resolves to `Some(None)` rather than propagating the
/// ID-Interner's backend failure up to the caller.
async fn resolve_filters(state: &AppState, query: &AggregatesQuery) -> FilterIds {
    async fn resolve_one(state: &AppState, collection: &str, value: &Option<String>) -> Option<Option<u16>> {
        let value = value.as_ref()?;
        match get_u16_id(state.interner.as_ref(), collection, value, false).await {
            Ok(id) => Some(Some(id)),
            Err(err) => {
                tracing::debug!(collection, value, error = %err, "aggregate filter value not yet interned; matching nothing");
                Some(None)
            }
        }
    }

    FilterIds {
        origin: resolve_one(state, ORIGIN_COLLECTION, &query.origin).await,
        brand_id: resolve_one(state, BRAND_COLLECTION, &query.brand_id).await,
        category_id: resolve_one(state, CATEGORY_COLLECTION, &query.category_id).await,
    }
}

fn matches_filters(key: AggregateKey, filters: &FilterIds) -> bool {
    if let Some(expected) = filters.category_id {
        if expected != Some(key.category_id) {
            return false;
        }
    }
    if let Some(expected) = filters.brand_id {
        if expected != Some(key.brand_id) {
            return false;
        }
    }
    if let Some(expected) = filters.origin {
        if expected != Some(key.origin_id) {
            return false;
        }
    }
    true
}

fn action_bin(action: Action) -> &'static str {
    match action {
        Action::View => "views",
        Action::Buy => "buys",
    }
}

/// `POST /aggregates` (spec §4.3).
pub async fn query_aggregates(State(state): State<AppState>, Query(query): Query<AggregatesQuery>) -> ApiResult<Json<AggregatesResponse>> {
    let range = MinuteTimeRange::parse(&query.time_range).map_err(|err| ApiError::validation("bad_time_range", err.to_string()))?;

    let action = match query.action.as_str() {
        "VIEW" => Action::View,
        "BUY" => Action::Buy,
        other => return Err(ApiError::validation("bad_action", format!("unknown action '{other}'"))),
    };

    let kinds = query.parse_aggregates().map_err(|message| ApiError::validation("bad_aggregates", message))?;

    let filters = resolve_filters(&state, &query).await;

    let mut columns = vec!["1m_bucket".to_string(), "action".to_string()];
    if query.origin.is_some() {
        columns.push("origin".to_string());
    }
    if query.brand_id.is_some() {
        columns.push("brand_id".to_string());
    }
    if query.category_id.is_some() {
        columns.push("category_id".to_string());
    }
    for kind in &kinds {
        columns.push(kind.column_name().to_string());
    }

    let bin = action_bin(action);
    let mut rows = Vec::new();
    for minute in range.minutes() {
        let set = AggregateKey::set_shard(minute);
        let cells = state.store.scan_all(&set, bin).await.map_err(ApiError::backend)?;

        let mut sum = 0u64;
        let mut count = 0u64;
        for (record_key, packed) in cells {
            let Some(cell_minute) = record_key.split('_').next().and_then(|m| m.parse::<i64>().ok()) else { continue };
            if cell_minute != minute {
                continue;
            }
            let Some(packed_key) = record_key.split('_').nth(1).and_then(|k| k.parse::<u64>().ok()) else { continue };
            let key = AggregateKey::decode(packed_key);
            if !matches_filters(key, &filters) {
                continue;
            }
            let aggregate = ActionAggregate::unpack(packed);
            sum += aggregate.sum;
            count += aggregate.count as u64;
        }

        let mut row = vec![minute_to_second_precision(minute), query.action.clone()];
        if let Some(origin) = &query.origin {
            row.push(origin.clone());
        }
        if let Some(brand_id) = &query.brand_id {
            row.push(brand_id.clone());
        }
        if let Some(category_id) = &query.category_id {
            row.push(category_id.clone());
        }
        for kind in &kinds {
            row.push(match kind {
                AggregateKind::Count => count.to_string(),
                AggregateKind::SumPrice => sum.to_string(),
            });
        }
        rows.push(row);
    }

    Ok(Json(AggregatesResponse { columns, rows }))
}

fn minute_to_second_precision(minute: i64) -> String {
    let dt = chrono::DateTime::<chrono::Utc>::from_timestamp(minute * 60, 0).expect("minute*60 is a valid unix timestamp");
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::GcPool;
    use allezon_interner_client::{InternerClient, NullInternerClient};
    use allezon_log::{LogProducer, NullLog};
    use allezon_store::{InMemoryStore, RecordStore};
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

    #[tokio::test]
    async fn counts_and_sums_one_minute() {
        let state = state();
        let minute = MinuteTimeRange::parse("2021-06-01T12:00:00_2021-06-01T12:01:00").unwrap().minutes().next().unwrap();
        let set = AggregateKey::set_shard(minute);
        let key = AggregateKey::new(0, 0, 0).record_key(minute);
        state.store.add(&set, &key, "views", ActionAggregate::increment(100)).await.unwrap();
        state.store.add(&set, &key, "views", ActionAggregate::increment(50)).await.unwrap();

        let query = AggregatesQuery {
            time_range: "2021-06-01T12:00:00_2021-06-01T12:01:00".to_string(),
            action: "VIEW".to_string(),
            aggregates: "COUNT,SUM_PRICE".to_string(),
            origin: None,
            brand_id: None,
            category_id: None,
        };
        let response = query_aggregates(State(state), Query(query)).await.unwrap().0;
        assert_eq!(response.columns, vec!["1m_bucket", "action", "count", "sum_price"]);
        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0][2], "2");
        assert_eq!(response.rows[0][3], "150");
    }

    #[tokio::test]
    async fn unresolvable_filter_yields_zero_rows_without_erroring() {
        use allezon_interner_client::InternerError;
        use async_trait::async_trait;

        struct UnknownEverything;
        #[async_trait]
        impl InternerClient for UnknownEverything {
            async fn get_id(&self, _c: &str, _e: &str, _m: bool) -> Result<i32, InternerError> {
                Err(InternerError::Status(500))
            }
        }

        let mut state = state();
        state.interner = Arc::new(UnknownEverything);

        let minute = MinuteTimeRange::parse("2021-06-01T12:00:00_2021-06-01T12:01:00").unwrap().minutes().next().unwrap();
        let set = AggregateKey::set_shard(minute);
        let key = AggregateKey::new(0, 5, 0).record_key(minute);
        state.store.add(&set, &key, "views", ActionAggregate::increment(999)).await.unwrap();

        let query = AggregatesQuery {
            time_range: "2021-06-01T12:00:00_2021-06-01T12:01:00".to_string(),
            action: "VIEW".to_string(),
            aggregates: "COUNT".to_string(),
            origin: Some("https://unknown/".to_string()),
            brand_id: None,
            category_id: None,
        };
        let response = query_aggregates(State(state), Query(query)).await.unwrap().0;
        assert_eq!(response.rows[0].last().unwrap(), "0");
    }
}
