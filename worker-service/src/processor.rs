use std::sync::Arc;

use allezon_interner_client::{get_u16_id, InternerClient, InternerError, BRAND_COLLECTION, CATEGORY_COLLECTION, ORIGIN_COLLECTION};
use allezon_store::{RecordStore, StoreError};
use allezon_types::{Action, AggregateKey, ActionAggregate, UserTag};
use thiserror::Error;

pub const AGGREGATES_SET_NAMESPACE: &str = "aggregates";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("dimension id resolution failed: {0}")]
    Interner(#[from] InternerError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

fn bin_for_action(action: Action) -> &'static str {
    match action {
        Action::View => "views",
        Action::Buy => "buys",
    }
}

/// One pass of spec §4.4's per-message flow: resolve dimension ids,
/// derive the minute bucket, and atomically apply the packed counter
/// increment. Called repeatedly by the caller's retry loop; has no
/// retry logic of its own.
pub async fn process_tag_once(
    tag: &UserTag,
    store: &Arc<dyn RecordStore>,
    interner: &Arc<dyn InternerClient>,
) -> Result<(), ProcessError> {
    let category_id = get_u16_id(interner.as_ref(), CATEGORY_COLLECTION, &tag.product_info.category_id, true).await?;
    let brand_id = get_u16_id(interner.as_ref(), BRAND_COLLECTION, &tag.product_info.brand_id, true).await?;
    let origin_id = get_u16_id(interner.as_ref(), ORIGIN_COLLECTION, &tag.origin, true).await?;

    let minute = tag.minute();
    let set = AggregateKey::set_shard(minute);
    let key = AggregateKey::new(category_id, brand_id, origin_id).record_key(minute);
    let bin = bin_for_action(tag.action);
    let delta = ActionAggregate::increment(tag.product_info.price);

    store.add(&set, &key, bin, delta).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use allezon_interner_client::NullInternerClient;
    use allezon_store::InMemoryStore;
    use allezon_types::{Device, ProductInfo};
    use chrono::{DateTime, Utc};

    fn sample_tag() -> UserTag {
        UserTag {
            time: "2021-06-01T12:00:00.000Z".parse::<DateTime<Utc>>().unwrap(),
            cookie: "c1".into(),
            country: "PL".into(),
            origin: "https://g/".into(),
            device: Device::Pc,
            action: Action::Buy,
            product_info: ProductInfo { product_id: 1, brand_id: "adidas".into(), category_id: "shoes".into(), price: 250 },
        }
    }

    #[tokio::test]
    async fn increments_aggregate_for_null_dimensions() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let interner: Arc<dyn InternerClient> = Arc::new(NullInternerClient);
        let tag = sample_tag();

        process_tag_once(&tag, &store, &interner).await.unwrap();

        let minute = tag.minute();
        let set = AggregateKey::set_shard(minute);
        let key = AggregateKey::new(0, 0, 0).record_key(minute);
        let rows = store.scan_all(&set, "buys").await.unwrap();
        assert_eq!(rows, vec![(key, ActionAggregate::increment(250))]);
    }

    #[tokio::test]
    async fn repeated_tags_accumulate_into_one_cell() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let interner: Arc<dyn InternerClient> = Arc::new(NullInternerClient);
        let tag = sample_tag();

        process_tag_once(&tag, &store, &interner).await.unwrap();
        process_tag_once(&tag, &store, &interner).await.unwrap();

        let minute = tag.minute();
        let set = AggregateKey::set_shard(minute);
        let rows = store.scan_all(&set, "buys").await.unwrap();
        assert_eq!(rows.len(), 1);
        let unpacked = ActionAggregate::unpack(rows[0].1);
        assert_eq!(unpacked, ActionAggregate { sum: 500, count: 2 });
    }
}
