use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use pressdesk_api::config::{LogFormat, ServerConfig};
use pressdesk_api::router::build_app_router;
use pressdesk_api::state::AppState;
use pressdesk_api::{background, bootstrap};
use pressdesk_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "pressdesk_api=debug,pressdesk_db=info,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::from_env());

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Configuration loaded");

    let pool = prepare_database().await;
    bootstrap::ensure_admin(&pool, config.bootstrap_admin.as_ref())
        .await
        .expect("Failed to bootstrap admin account");

    let cancel = CancellationToken::new();
    let cleanup = tokio::spawn(background::session_cleanup::run(
        pool.clone(),
        Duration::from_secs(config.session_cleanup_interval_secs),
        cancel.clone(),
    ));

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let app = build_app_router(AppState {
        pool,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "PressDesk API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    stop_background(cancel, cleanup, shutdown_timeout).await;
    tracing::info!("Shutdown complete");
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Connect, verify, and migrate. Any failure aborts startup.
async fn prepare_database() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = pressdesk_db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    pressdesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    pressdesk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");
    pool
}

async fn stop_background(cancel: CancellationToken, job: JoinHandle<()>, wait: Duration) {
    cancel.cancel();
    match tokio::time::timeout(wait, job).await {
        Ok(Ok(())) => tracing::debug!("Session cleanup stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Session cleanup task failed"),
        Err(_) => tracing::warn!(timeout_secs = wait.as_secs(), "Session cleanup did not stop in time"),
    }
}

async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down");
}
