use std::sync::Arc;

use common::ResumeStore;
use common::config::StorageBackendKind;
use common::storage::ChunkStore;
use common::storage::memory::MemoryChunkStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jobquest_server::config::AppConfig;
use jobquest_server::database::init_db;
use jobquest_server::state::AppState;
use jobquest_server::store::DatabaseChunkStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let store: Arc<dyn ChunkStore> = match config.storage.backend {
        StorageBackendKind::Database => {
            let db = init_db(&config.database).await?;
            info!("Connected to database");
            Arc::new(DatabaseChunkStore::new(db))
        }
        StorageBackendKind::Memory => {
            warn!("Using in-memory resume storage; files are lost on restart");
            Arc::new(MemoryChunkStore::new())
        }
    };

    let resumes = ResumeStore::new(store, &config.storage);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        resumes,
    };

    let app = jobquest_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
