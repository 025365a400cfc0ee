use std::net::SocketAddr;
use std::sync::Arc;

use allezon_config::AllezonConfig;
use allezon_observability::{init_tracing, HttpErrorMetrics};
use allezon_store::{InMemoryStore, RecordStore};
use prometheus::Registry;
use store_service::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AllezonConfig::from_env()?;
    init_tracing(&config.log_level);

    // This is the one process that actually owns the in-memory record
    // store (DESIGN.md, common/allezon-store). `api-service`,
    // `worker-service`, and `id-interner-service` all run
    // `allezon_store::HttpRecordStore` pointed at this instance instead
    // of constructing their own, so they observe each other's writes.
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());

    let registry = Arc::new(Registry::new());
    let error_metrics = HttpErrorMetrics::register(&registry)?;

    let app = build_router(AppState { store, registry, error_metrics });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting store-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
