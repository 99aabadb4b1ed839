//! cfp-server - Call for papers HTTP service
//!
//! Loads the TOML bootstrap config, opens (or creates) the SQLite database
//! and serves the JSON API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cfp_common::config::{AppConfig, ConfigOverrides};
use cfp_common::db::init_database;
use cfp_server::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cfp-server
#[derive(Parser, Debug)]
#[command(name = "cfp-server")]
#[command(about = "Call for papers submission and review service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CFP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "CFP_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "CFP_DATABASE")]
    database: Option<PathBuf>,

    /// Rating system (yesno, onetoten)
    #[arg(long, env = "CFP_RATING_SYSTEM")]
    rating_system: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CFP_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        database_path: args.database,
        port: args.port,
        rating_system: args.rating_system,
        log_level: args.log_level,
    };
    let config = AppConfig::resolve(args.config.as_deref(), overrides)
        .await
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cfp_server={0},cfp_common={0},tower_http={0}", config.logging.level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting cfp-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let rating_scheme = config.rating_scheme();
    info!("Rating system: {}", rating_scheme.rating_name());
    match config.cfp.start {
        Some(start) => info!("Call for proposals: {} to {}", start, config.cfp.end),
        None => info!("Call for proposals open until {}", config.cfp.end),
    }

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    let state = AppState::new(pool, rating_scheme, config.cfp);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("cfp-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
