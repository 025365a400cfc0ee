use std::time::Duration;

use allezon_types::UserTag;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::topic_partition_list::{Offset, TopicPartitionList};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::util::Timeout;

use crate::error::LogError;
use crate::log::{Delivery, DeliveryToken, LogConsumer, LogProducer, USER_TAGS_CONSUMER_GROUP, USER_TAGS_TOPIC};
use crate::partition::partition_for_cookie;

#[derive(Clone)]
pub struct KafkaLogConfig {
    pub bootstrap_servers: String,
    pub num_partitions: i32,
    pub replication_factor: i32,
}

/// Creates `user-tags` with the configured partition count and
/// replication factor if it does not already exist (spec §6.2).
pub async fn ensure_topic(config: &KafkaLogConfig) -> Result<(), LogError> {
    let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", &config.bootstrap_servers)
        .create()
        .map_err(|e| LogError::TopicAdmin(e.to_string()))?;

    let topic = NewTopic::new(
        USER_TAGS_TOPIC,
        config.num_partitions,
        TopicReplication::Fixed(config.replication_factor),
    );
    let results = admin
        .create_topics([&topic], &AdminOptions::new())
        .await
        .map_err(|e| LogError::TopicAdmin(e.to_string()))?;

    for result in results {
        match result {
            Ok(topic) => tracing::info!(topic = %topic, "topic created"),
            Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                tracing::info!(topic = %topic, "topic already exists");
            }
            Err((topic, code)) => return Err(LogError::TopicAdmin(format!("{topic}: {code:?}"))),
        }
    }
    Ok(())
}

pub struct KafkaLogProducer {
    producer: FutureProducer,
    partition_count: u32,
}

impl KafkaLogProducer {
    pub fn new(config: &KafkaLogConfig) -> Result<Self, LogError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .create()
            .map_err(|e| LogError::Backend(e.to_string()))?;
        Ok(Self {
            producer,
            partition_count: config.num_partitions.max(1) as u32,
        })
    }
}

#[async_trait]
impl LogProducer for KafkaLogProducer {
    async fn publish(&self, tag: &UserTag) -> Result<(), LogError> {
        let payload = serde_json::to_vec(tag)?;
        let partition = partition_for_cookie(&tag.cookie, self.partition_count);
        let record = FutureRecord::to(USER_TAGS_TOPIC)
            .payload(&payload)
            .partition(partition)
            .key(tag.cookie.as_str());
        self.producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
            .map_err(|(err, _)| LogError::Backend(err.to_string()))?;
        Ok(())
    }
}

pub struct KafkaLogConsumer {
    consumer: StreamConsumer,
}

impl KafkaLogConsumer {
    pub fn new(config: &KafkaLogConfig) -> Result<Self, LogError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("group.id", USER_TAGS_CONSUMER_GROUP)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| LogError::Backend(e.to_string()))?;
        consumer
            .subscribe(&[USER_TAGS_TOPIC])
            .map_err(|e| LogError::Backend(e.to_string()))?;
        Ok(Self { consumer })
    }
}

#[async_trait]
impl LogConsumer for KafkaLogConsumer {
    async fn poll(&self) -> Result<Delivery, LogError> {
        let message = self.consumer.recv().await.map_err(|e| LogError::Backend(e.to_string()))?;
        let payload = message
            .payload()
            .ok_or_else(|| LogError::Backend("message had no payload".to_string()))?;
        let tag: UserTag = serde_json::from_slice(payload)?;
        let owned = message.detach();
        Ok(Delivery {
            tag,
            token: DeliveryToken::Kafka(Box::new(owned)),
        })
    }

    async fn mark(&self, delivery: Delivery) -> Result<(), LogError> {
        match delivery.token {
            DeliveryToken::Kafka(owned) => {
                let mut tpl = TopicPartitionList::new();
                tpl.add_partition_offset(owned.topic(), owned.partition(), Offset::Offset(owned.offset() + 1))
                    .map_err(|e| LogError::Backend(e.to_string()))?;
                self.consumer
                    .commit(&tpl, CommitMode::Async)
                    .map_err(|e| LogError::Backend(e.to_string()))
            }
            DeliveryToken::Null => Ok(()),
        }
    }
}
