//! # Frantoio Server
//!
//! REST API for the olive-oil storefront and admin back-office.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Server Startup                                   │
//! │                                                                         │
//! │  load config ──► init tracing ──► open SQLite (+ migrations)           │
//! │       │                                                                 │
//! │       ├──► spawn notification worker (outbox poller)                   │
//! │       │                                                                 │
//! │       └──► build router ──► serve until ctrl-c / SIGTERM               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frantoio_db::{Database, DbConfig};
use frantoio_notify::{NotificationWorker, NotifyConfig};
use frantoio_server::config::AppConfig;
use frantoio_server::routes::build_router;
use frantoio_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Frantoio server...");

    // Load configuration
    let config = AppConfig::load()?;
    let notify_config = NotifyConfig::load();
    info!(
        port = config.http_port,
        db = %config.database_path,
        admin_login = config.admin_password_hash.is_some(),
        email = notify_config.email.is_some(),
        telegram = notify_config.telegram.is_some(),
        whatsapp = notify_config.whatsapp.is_some(),
        "Configuration loaded"
    );

    // Connect to the database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    // Spawn the notification worker
    let (worker, worker_handle) = NotificationWorker::new(db.clone(), &notify_config)?;
    tokio::spawn(worker.run());

    // Build shared state and router
    let state = AppState::new(db.clone(), config.clone(), notify_config);
    let app = build_router(state);

    // Serve
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain background work before exit
    worker_handle.shutdown().await;
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
