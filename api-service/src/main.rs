use std::net::SocketAddr;
use std::sync::Arc;

use allezon_config::AllezonConfig;
use allezon_interner_client::{HttpInternerClient, InternerClient, NullInternerClient};
use allezon_log::{ensure_topic, KafkaLogConfig, KafkaLogProducer, LogProducer, NullLog};
use allezon_observability::{init_tracing, HttpErrorMetrics};
use allezon_store::{HttpRecordStore, InMemoryStore, RecordStore};
use api_service::{build_router, AppState, GcPool};
use prometheus::Registry;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AllezonConfig::from_env()?;
    init_tracing(&config.log_level);

    // Profile reads, user_tags ingest, and the /aggregates scan all hit
    // the same record store worker-service writes into, so this
    // process is an HTTP client of store-service rather than an owner
    // of its own copy; `db_profiles_null_client` selects the unshared
    // fallback for tests and local runs.
    let store: Arc<dyn RecordStore> = if config.db_profiles_null_client {
        Arc::new(InMemoryStore::new())
    } else {
        let address = config
            .db_profiles_addresses
            .first()
            .cloned()
            .expect("db_profiles_addresses must be set unless db_profiles_null_client is true");
        Arc::new(HttpRecordStore::new(address))
    };

    let log: Arc<dyn LogProducer> = if config.kafka_null_client {
        Arc::new(NullLog)
    } else {
        let kafka_config = KafkaLogConfig {
            bootstrap_servers: config.kafka_addresses.join(","),
            num_partitions: config.kafka_num_partitions,
            replication_factor: config.kafka_replication_factor,
        };
        ensure_topic(&kafka_config).await?;
        Arc::new(KafkaLogProducer::new(&kafka_config)?)
    };

    let interner: Arc<dyn InternerClient> = if config.id_getter_null_client {
        Arc::new(NullInternerClient)
    } else {
        Arc::new(HttpInternerClient::new(config.id_getter_address.clone()))
    };

    let gc = GcPool::spawn(store.clone());

    let registry = Arc::new(Registry::new());
    let error_metrics = HttpErrorMetrics::register(&registry)?;

    let app = build_router(AppState { store, log, interner, gc, registry, error_metrics });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting api-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
