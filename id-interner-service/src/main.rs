use std::net::SocketAddr;
use std::sync::Arc;

use allezon_config::AllezonConfig;
use allezon_observability::{init_tracing, HttpErrorMetrics};
use allezon_store::{HttpRecordStore, InMemoryStore, RecordStore};
use id_interner_service::{build_router, AppState, IdResolver};
use prometheus::Registry;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AllezonConfig::from_env()?;
    init_tracing(&config.log_level);

    // The ids set lives in the same shared record store as profiles
    // and aggregates (spec §2, "one namespace holds everything"), so
    // this process talks to store-service over HTTP rather than
    // keeping its own in-memory copy; `db_profiles_null_client` still
    // selects the unshared fallback for tests and local runs.
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
    let resolver = Arc::new(IdResolver::new(store));

    let registry = Arc::new(Registry::new());
    let error_metrics = HttpErrorMetrics::register(&registry)?;

    let app = build_router(AppState { resolver, registry, error_metrics });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting id-interner-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
