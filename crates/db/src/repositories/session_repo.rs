//! Repository for `user_sessions`.

use pressdesk_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::session::{NewRefreshSession, RefreshSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, \
                        user_agent, ip_address, created_at, updated_at";

/// Issues, rotates, and revokes refresh sessions.
pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(
        pool: &PgPool,
        session: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, session).await
    }

    /// The unrevoked, unexpired session holding `token_hash`.
    pub async fn find_active(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE refresh_token_hash = $1 AND NOT is_revoked AND expires_at > NOW()"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke session `old_id` and issue `next` in one transaction.
    ///
    /// Returns `None`, with nothing written, when `old_id` was already
    /// revoked. Of two concurrent refreshes with the same token only one
    /// gets a new session.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        next: &NewRefreshSession,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let revoked = sqlx::query(
            "UPDATE user_sessions SET is_revoked = TRUE
             WHERE id = $1 AND NOT is_revoked AND expires_at > NOW()",
        )
        .bind(old_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if revoked == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let session = Self::insert(&mut tx, next).await?;
        tx.commit().await?;
        Ok(Some(session))
    }

    /// Revoke every live session of `user_id`, returning how many there were.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = TRUE WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that can no longer be used.
    pub async fn purge_stale(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE is_revoked OR expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert(
        conn: &mut PgConnection,
        session: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions
                (user_id, refresh_token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(session.user_id)
            .bind(&session.refresh_token_hash)
            .bind(session.expires_at)
            .bind(&session.user_agent)
            .bind(&session.ip_address)
            .fetch_one(conn)
            .await
    }
}
