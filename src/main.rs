//! Arbiter - Application Entry Point
//!
//! This is the main entry point for the Arbiter server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arbiter::{
    config::{StorageBackend, CONFIG},
    coordinator::{Coordinator, CoordinatorSettings},
    db::{self, Datastore, MemoryDatastore, PgDatastore},
    handlers,
    judge::HttpJudgeClient,
    state::AppState,
    storage::FsSourceStore,
    utils::fingerprint,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into());
    if CONFIG.server.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Arbiter server...");

    let store: Arc<dyn Datastore> = match CONFIG.storage.backend {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(&CONFIG.database).await?;
            db::test_connection(&pool).await?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool).await?;

            Arc::new(PgDatastore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory datastore; nothing survives a restart");
            Arc::new(MemoryDatastore::new())
        }
    };

    let sources = Arc::new(FsSourceStore::new(CONFIG.storage.sources_path.clone()));
    let judge = Arc::new(HttpJudgeClient::new(&CONFIG.judge)?);
    tracing::info!(
        judge = %CONFIG.judge.base_url,
        callback_base = %CONFIG.judge.callback_base_url,
        secret = %fingerprint(&CONFIG.judge.callback_secret),
        "Judge client configured"
    );

    let coordinator = Coordinator::new(
        store,
        sources,
        judge,
        CoordinatorSettings::from_config(&CONFIG),
    );

    // Create application state
    let state = AppState::new(Arc::new(coordinator), CONFIG.clone());

    // Build the router
    let app = handlers::router(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
