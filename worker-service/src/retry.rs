use std::sync::Arc;
use std::time::Duration;

use allezon_interner_client::InternerClient;
use allezon_store::RecordStore;
use allezon_types::UserTag;
use backoff::ExponentialBackoff;
use tracing::warn;

use crate::processor::{process_tag_once, ProcessError};

/// Spec §4.4's retry policy: initial 1s, default multiplier, max
/// interval 300s, total elapsed budget 30s before giving up.
fn worker_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_secs(1),
        max_interval: Duration::from_secs(300),
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..ExponentialBackoff::default()
    }
}

/// Runs [`process_tag_once`] under the worker's backoff policy. On
/// exhaustion, logs and returns without panicking; the caller leaves
/// the message unmarked so it is redelivered (spec §9).
pub async fn process_tag_with_retry(tag: &UserTag, store: &Arc<dyn RecordStore>, interner: &Arc<dyn InternerClient>) -> bool {
    let outcome = backoff::future::retry(worker_backoff(), || async {
        process_tag_once(tag, store, interner).await.map_err(backoff::Error::transient)
    })
    .await;

    match outcome {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, cookie = %tag.cookie, time = %tag.time, "giving up processing user tag after exhausting retry budget");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allezon_interner_client::NullInternerClient;
    use allezon_store::InMemoryStore;
    use allezon_types::{Action, Device, ProductInfo};
    use chrono::{DateTime, Utc};

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
    async fn succeeds_on_first_attempt_without_retrying() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let interner: Arc<dyn InternerClient> = Arc::new(NullInternerClient);
        let tag = sample_tag();
        assert!(process_tag_with_retry(&tag, &store, &interner).await);
    }
}
