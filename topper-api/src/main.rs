//! topper-api - rating service entry point
//!
//! Serves the JSON API over a flat-file item store and rating ledger, plus
//! the static frontend when a public directory is available.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use topper_api::api::health::MODULE_NAME;
use topper_api::AppState;
use topper_common::config::{resolve_data_dir, TomlConfig};
use topper_common::store::{ContentStore, JsonFileStore};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PUBLIC_DIR: &str = "public";
/// How often idle rate limiter buckets are dropped
const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Command-line arguments for topper-api
#[derive(Parser, Debug)]
#[command(name = "topper-api")]
#[command(about = "Content rating service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "TOPPER_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "TOPPER_BIND")]
    bind: Option<String>,

    /// Directory holding items.json and ratings.json (overrides TOPPER_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "TOPPER_CONFIG")]
    config: Option<PathBuf>,

    /// Static frontend directory
    #[arg(long, env = "TOPPER_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration comes first so its log level applies from the start
    let config_path = TomlConfig::locate(args.config.as_deref());
    let config = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    topper_api::logging::init_tracing(&config.logging.level);
    info!("Starting {} v{}", MODULE_NAME, env!("CARGO_PKG_VERSION"));

    match config_path.as_deref().filter(|p| p.exists()) {
        Some(path) => info!("Configuration: {}", path.display()),
        None => warn!("No configuration file found, using built-in defaults"),
    }

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    let store = JsonFileStore::new(&data_dir);
    store
        .ensure_data_dir()
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    info!("Data directory: {}", data_dir.display());

    // Fail fast on a corrupt store rather than on the first request
    let items = store.read_items().context("Failed to read item store")?;
    let ratings = store.read_ratings().context("Failed to read rating ledger")?;
    info!(items = items.len(), ratings = ratings.len(), "Store loaded");

    let mut state = AppState::new(Arc::new(store), &config.rate_limits)
        .context("Invalid rate limit configuration")?;
    info!(
        api_per_minute = config.rate_limits.api_per_minute,
        ratings_per_minute = config.rate_limits.ratings_per_minute,
        "Rate limits configured"
    );

    let public_dir = args
        .public_dir
        .or_else(|| config.public_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR));
    if public_dir.is_dir() {
        info!("Serving static files from {}", public_dir.display());
        state = state.with_public_dir(public_dir);
    } else {
        warn!(
            "Public directory {} not found, static frontend disabled",
            public_dir.display()
        );
    }

    let limiters = state.limiters.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            limiters.retain_recent();
        }
    });

    let app = topper_api::build_router(state);

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let bind = args
        .bind
        .or_else(|| config.bind_addr.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;
    let addr = SocketAddr::new(ip, port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
