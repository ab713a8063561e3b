// ABOUTME: Entry point for the kvwatch binary.
// ABOUTME: Parses CLI flags, loads env config, starts the backup loop and HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kvwatch_core::Storage;
use kvwatch_server::{AppState, KvwatchConfig, StorageBackend, create_router};
use kvwatch_store::{FileStorage, MemoryStorage, start_backup_loop};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Minimal key-value HTTP service with a long-poll change feed and
/// periodic full-dump backups.
#[derive(Debug, Parser)]
#[command(name = "kvwatch", version)]
struct Cli {
    /// Socket address to bind (overrides KVWATCH_BIND)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Storage backend, memory or file (overrides KVWATCH_STORAGE)
    #[arg(long)]
    storage: Option<String>,

    /// File backend location (overrides KVWATCH_DATA_PATH)
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Seconds between backups (overrides KVWATCH_BACKUP_INTERVAL)
    #[arg(long)]
    backup_interval: Option<String>,

    /// Backup destination (overrides KVWATCH_BACKUP_PATH)
    #[arg(long)]
    backup_path: Option<PathBuf>,

    /// Static asset directory served at /public (overrides KVWATCH_PUBLIC_DIR)
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvwatch=debug,tower_http=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = KvwatchConfig::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(storage) = cli.storage.as_deref() {
        config.storage = storage.parse()?;
    }
    if let Some(path) = cli.data_path {
        config.data_path = path;
    }
    if let Some(secs) = cli.backup_interval.as_deref() {
        config.backup_interval = KvwatchConfig::interval_from_secs_str(secs)?;
    }
    if let Some(path) = cli.backup_path {
        config.backup_path = path;
    }
    if let Some(dir) = cli.public_dir {
        config.public_dir = Some(dir);
    }

    let storage: Arc<dyn Storage> = match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(
            FileStorage::open(&config.data_path)
                .with_context(|| format!("failed to open {}", config.data_path.display()))?,
        ),
    };

    let _backup_task = start_backup_loop(
        config.backup_interval,
        Arc::clone(&storage),
        config.backup_path.clone(),
    );

    let state = Arc::new(AppState::new(storage));
    let mut app = create_router(state);
    if let Some(dir) = &config.public_dir {
        app = app.nest_service("/public", ServeDir::new(dir));
    }
    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("kvwatch listening on {}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
