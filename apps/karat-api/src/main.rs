//! # Karat API
//!
//! HTTP server for the Karat transactional engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Karat API Server                                 │
//! │                                                                         │
//! │  POS / back office ───► HTTP (8080) ───► karat-db ───► SQLite          │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                                        karat-core                       │
//! │                               (pricing, totals, transitions)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use karat_api::{router, ApiConfig, AppState};
use karat_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,karat_db=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Karat API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        addr = %config.bind_address(),
        database = %config.database_path,
        tax_bps = config.finished_goods_tax_bps,
        cash_limit = config.cash_limit,
        "Configuration loaded"
    );

    // Open database (migrations run on connect)
    let db = Database::with_settings(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
        config.engine_settings(),
    )
    .await?;
    info!("Database ready");

    let app = router(AppState::new(db.clone()));

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(addr = %config.bind_address(), "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
