use async_trait::async_trait;
use allezon_types::UserTag;

use crate::error::LogError;

pub const USER_TAGS_TOPIC: &str = "user-tags";
pub const USER_TAGS_CONSUMER_GROUP: &str = "user-tags-consumer-group";

/// The producing half of the partitioned-log seam. `publish` blocks
/// until the broker (or the null sink) acknowledges the write (spec
/// §4.2, "the producer waits for broker acknowledgement").
#[async_trait]
pub trait LogProducer: Send + Sync {
    async fn publish(&self, tag: &UserTag) -> Result<(), LogError>;
}

/// One delivered message plus whatever the backend needs to mark it
/// processed. Consumers must call [`LogConsumer::mark`] only after the
/// tag has been durably applied; an unmarked delivery is redelivered
/// on restart (spec §6.2, "commit offsets per message via explicit
/// mark after successful processing").
pub struct Delivery {
    pub tag: UserTag,
    pub(crate) token: DeliveryToken,
}

pub(crate) enum DeliveryToken {
    Kafka(Box<rdkafka::message::OwnedMessage>),
    Null,
}

#[async_trait]
pub trait LogConsumer: Send + Sync {
    /// Blocks until the next message is available.
    async fn poll(&self) -> Result<Delivery, LogError>;

    /// Commits the delivery's offset. Idempotent with respect to
    /// crash-restart: an uncommitted offset simply redelivers.
    async fn mark(&self, delivery: Delivery) -> Result<(), LogError>;
}
