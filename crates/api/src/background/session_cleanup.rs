//! Periodic removal of expired and revoked refresh sessions.

use std::time::Duration;

use pressdesk_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the session cleanup loop until `cancel` fires.
///
/// The first sweep happens immediately on start.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                match SessionRepo::purge_stale(&pool).await {
                    Ok(0) => tracing::debug!("Session cleanup: nothing to delete"),
                    Ok(deleted) => tracing::info!(deleted, "Session cleanup: removed stale sessions"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}
