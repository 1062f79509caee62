//! wsw-intake - Window strike report intake service
//!
//! Accepts photo-documented window-strike reports through a four-step submission workflow
//! and serves the persisted reports, their statistics and map points.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wsw_common::config::{self as common_config, TomlConfig};
use wsw_common::events::EventBus;

use wsw_intake::services::LocalObjectStore;
use wsw_intake::AppState;

/// Command-line arguments for wsw-intake
#[derive(Parser, Debug)]
#[command(name = "wsw-intake")]
#[command(about = "Window strike report intake service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the TOML config)
    #[arg(short, long, env = "WSW_PORT")]
    port: Option<u16>,

    /// Root folder holding the database and photos
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long, env = "WSW_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wsw_intake=debug,wsw_common=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting wsw-intake (Window Strike Watch intake)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Step 1: Load TOML config (missing file means defaults)
    let mut toml_config = match args
        .config
        .clone()
        .or_else(|| common_config::default_config_path("wsw-intake"))
    {
        Some(path) => common_config::load_toml_config(&path)?,
        None => TomlConfig::default(),
    };
    if let Some(port) = args.port {
        toml_config.port = port;
    }

    // Step 2: Resolve root folder and open the database
    let root_folder = common_config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = common_config::ensure_root_folder(&root_folder)
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", root_folder.display());
    info!("Database: {}", db_path.display());

    let db_pool = wsw_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    // Step 3: Collaborators
    let photo_dir = common_config::photo_dir(&root_folder, &toml_config);
    std::fs::create_dir_all(&photo_dir)
        .with_context(|| format!("Failed to create photo folder {}", photo_dir.display()))?;
    let object_store = Arc::new(LocalObjectStore::new(
        photo_dir.clone(),
        format!("{}/photos", toml_config.public_base_url()),
    ));
    let classifier = wsw_intake::config::build_classifier(&toml_config);

    let event_bus = EventBus::new(100);
    let state = AppState::new(db_pool, event_bus, object_store, classifier, photo_dir);
    let count = state
        .load_snapshot()
        .await
        .context("Failed to load existing reports")?;
    info!("Loaded {} existing reports", count);

    let app = wsw_intake::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], toml_config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
