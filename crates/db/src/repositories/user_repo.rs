//! Repository for the `users` table and its `user_roles` assignments.

use pressdesk_core::sync::SyncPlan;
use pressdesk_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::sync::{sync_join, SyncError, USER_ROLES};

const COLUMNS: &str = "id, name, email, password_hash, is_active, \
                        last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// Outcome of a rejected password.
#[derive(Debug, Clone, Copy)]
pub struct FailedLogin {
    /// Consecutive failures including this one.
    pub failures: i32,
    pub locked_until: Option<Timestamp>,
}

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, input).await
    }

    /// Insert a user and assign `role_ids` atomically. Unknown role ids
    /// leave no user behind.
    pub async fn create_with_roles(
        pool: &PgPool,
        input: &CreateUser,
        role_ids: &[DbId],
    ) -> Result<User, SyncError> {
        let mut tx = pool.begin().await?;
        let user = Self::insert(&mut tx, input).await?;
        sync_join(&mut tx, USER_ROLES, user.id, role_ids).await?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email, ignoring case.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users, newest first, optionally matching `q` against name or email.
    pub async fn list(
        pool: &PgPool,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let pattern = q.map(|q| format!("%{q}%"));
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count users. Used to decide whether to bootstrap the first account.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Update a user and, when `role_ids` is `Some`, re-sync their roles,
    /// all in one transaction.
    ///
    /// Returns `Ok(None)` if no row with the given `id` exists.
    pub async fn update_with_roles(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
        role_ids: Option<&[DbId]>,
    ) -> Result<Option<(User, SyncPlan)>, SyncError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(user) = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let plan = match role_ids {
            Some(ids) => sync_join(&mut tx, USER_ROLES, id, ids).await?,
            None => SyncPlan::default(),
        };

        tx.commit().await?;
        Ok(Some((user, plan)))
    }

    /// `false` when the user is missing or already inactive.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a wrong password. Reaching `max_failures` sets `locked_until`
    /// to `lock_until` in the same statement. A lock that has already run
    /// out starts a fresh streak, so this failure counts as the first.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_failures: i32,
        lock_until: Timestamp,
    ) -> Result<FailedLogin, sqlx::Error> {
        let (failures, locked_until) = sqlx::query_as::<_, (i32, Option<Timestamp>)>(
            "UPDATE users SET
                failed_login_count = CASE
                    WHEN locked_until <= NOW() THEN 1
                    ELSE failed_login_count + 1
                END,
                locked_until = CASE
                    WHEN (CASE WHEN locked_until <= NOW() THEN 1 ELSE failed_login_count + 1 END) >= $2::INT
                        THEN $3::TIMESTAMPTZ
                    WHEN locked_until <= NOW() THEN NULL
                    ELSE locked_until
                END
             WHERE id = $1
             RETURNING failed_login_count, locked_until",
        )
        .bind(id)
        .bind(max_failures)
        .bind(lock_until)
        .fetch_one(pool)
        .await?;
        Ok(FailedLogin {
            failures,
            locked_until,
        })
    }

    /// Clears the failure counter and any lock, and stamps `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the password hash. Also lifts any lockout.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, failed_login_count = 0, locked_until = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether an active user with this id exists.
    pub async fn is_active(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(active.unwrap_or(false))
    }

    async fn insert(conn: &mut PgConnection, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash)
             VALUES ($1, LOWER($2), $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(conn)
            .await
    }
}
