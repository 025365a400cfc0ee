use allezon_types::UserTag;
use async_trait::async_trait;

use crate::error::LogError;
use crate::log::{Delivery, DeliveryToken, LogConsumer, LogProducer};

/// The `kafka_null_client` seam of spec §6.5: a no-op sink that logs
/// invoked methods and returns success, letting `api-service` and
/// `worker-service` boot without a broker. [`NullLog::poll`] never
/// resolves, mirroring a log with nothing to deliver.
#[derive(Default, Clone, Copy)]
pub struct NullLog;

#[async_trait]
impl LogProducer for NullLog {
    async fn publish(&self, tag: &UserTag) -> Result<(), LogError> {
        tracing::debug!(cookie = %tag.cookie, "null log producer invoked");
        Ok(())
    }
}

#[async_trait]
impl LogConsumer for NullLog {
    async fn poll(&self) -> Result<Delivery, LogError> {
        tracing::debug!("null log consumer invoked, blocking forever");
        std::future::pending().await
    }

    async fn mark(&self, delivery: Delivery) -> Result<(), LogError> {
        debug_assert!(matches!(delivery.token, DeliveryToken::Null));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use allezon_types::{Action, Device, ProductInfo, UserTag};

    fn sample_tag() -> UserTag {
        UserTag {
            time: Utc::now(),
            cookie: "c1".to_string(),
            country: "PL".to_string(),
            origin: "mobile_app".to_string(),
            device: Device::Pc,
            action: Action::View,
            product_info: ProductInfo {
                product_id: 1,
                brand_id: "b".to_string(),
                category_id: "c".to_string(),
                price: 100,
            },
        }
    }

    #[tokio::test]
    async fn publish_always_succeeds() {
        let log = NullLog;
        log.publish(&sample_tag()).await.unwrap();
    }

    #[tokio::test]
    async fn mark_always_succeeds() {
        let log = NullLog;
        let delivery = Delivery {
            tag: sample_tag(),
            token: DeliveryToken::Null,
        };
        log.mark(delivery).await.unwrap();
    }
}
