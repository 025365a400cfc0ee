use std::sync::Arc;

use allezon_config::AllezonConfig;
use allezon_interner_client::{HttpInternerClient, InternerClient, NullInternerClient};
use allezon_log::{ensure_topic, KafkaLogConfig, KafkaLogConsumer, LogConsumer, NullLog};
use allezon_observability::init_tracing;
use allezon_store::{HttpRecordStore, InMemoryStore, RecordStore};
use tracing::{error, info};
use worker_service::process_tag_with_retry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AllezonConfig::from_env()?;
    init_tracing(&config.log_level);

    // The aggregate increments written here must reach api-service's
    // /aggregates scan, so this process is an HTTP client of
    // store-service rather than an unshared in-memory store;
    // `db_aggregates_null_client` selects the unshared fallback for
    // tests and local runs.
    let store: Arc<dyn RecordStore> = if config.db_aggregates_null_client {
        Arc::new(InMemoryStore::new())
    } else {
        let address = config
            .db_aggregates_addresses
            .first()
            .cloned()
            .expect("db_aggregates_addresses must be set unless db_aggregates_null_client is true");
        Arc::new(HttpRecordStore::new(address))
    };

    let interner: Arc<dyn InternerClient> = if config.id_getter_null_client {
        Arc::new(NullInternerClient)
    } else {
        Arc::new(HttpInternerClient::new(config.id_getter_address.clone()))
    };

    let worker_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    info!(worker_count, "starting worker-service");

    let mut handles = Vec::with_capacity(worker_count);
    if config.kafka_null_client {
        let consumer: Arc<dyn LogConsumer> = Arc::new(NullLog);
        for id in 0..worker_count {
            handles.push(tokio::spawn(run_worker(id, consumer.clone(), store.clone(), interner.clone())));
        }
    } else {
        let kafka_config = KafkaLogConfig {
            bootstrap_servers: config.kafka_addresses.join(","),
            num_partitions: config.kafka_num_partitions,
            replication_factor: config.kafka_replication_factor,
        };
        ensure_topic(&kafka_config).await?;
        for id in 0..worker_count {
            let consumer: Arc<dyn LogConsumer> = Arc::new(KafkaLogConsumer::new(&kafka_config)?);
            handles.push(tokio::spawn(run_worker(id, consumer, store.clone(), interner.clone())));
        }
    }

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

async fn run_worker(
    id: usize,
    consumer: Arc<dyn LogConsumer>,
    store: Arc<dyn RecordStore>,
    interner: Arc<dyn InternerClient>,
) {
    loop {
        let delivery = match consumer.poll().await {
            Ok(delivery) => delivery,
            Err(err) => {
                error!(worker = id, error = %err, "log poll failed");
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                continue;
            }
        };

        if process_tag_with_retry(&delivery.tag, &store, &interner).await {
            if let Err(err) = consumer.mark(delivery).await {
                error!(worker = id, error = %err, "failed to mark message acknowledged");
            }
        }
    }
}
