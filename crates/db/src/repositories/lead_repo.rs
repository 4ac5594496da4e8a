//! Repository for the `leads` table.

use pressdesk_core::leads::{PRIORITY_MEDIUM, SOURCE_OTHER, STATUS_NEW};
use pressdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::lead::{CreateLead, Lead, LeadFilter, UpdateLead};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, first_name, last_name, email, phone, company, source, \
                                  status, priority, estimated_value_cents, assigned_to, \
                                  next_follow_up_at, last_contacted_at, closed_at, created_by, \
                                  created_at, updated_at";

/// Provides CRUD operations for leads.
pub struct LeadRepo;

impl LeadRepo {
    /// Insert a lead. Missing vocabulary fields take their defaults
    /// (`new`, `other`, `medium`).
    pub async fn create(
        pool: &PgPool,
        input: &CreateLead,
        assigned_to: Option<DbId>,
        created_by: DbId,
        closed_at: Option<Timestamp>,
    ) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads
                (first_name, last_name, email, phone, company, source, status, priority,
                 estimated_value_cents, assigned_to, next_follow_up_at, closed_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(input.source.as_deref().unwrap_or(SOURCE_OTHER))
            .bind(input.status.as_deref().unwrap_or(STATUS_NEW))
            .bind(input.priority.as_deref().unwrap_or(PRIORITY_MEDIUM))
            .bind(input.estimated_value_cents)
            .bind(assigned_to)
            .bind(input.next_follow_up_at)
            .bind(closed_at)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE id = $1");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered lead list, newest first.
    pub async fn list(pool: &PgPool, filter: &LeadFilter) -> Result<Vec<Lead>, sqlx::Error> {
        let pattern = filter.q.as_deref().map(|q| format!("%{q}%"));
        let query = format!(
            "SELECT {COLUMNS} FROM leads
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR source = $2)
               AND ($3::TEXT IS NULL OR priority = $3)
               AND ($4::BIGINT IS NULL OR assigned_to = $4)
               AND ($5::BIGINT IS NULL OR assigned_to = $5)
               AND ($6::TEXT IS NULL
                    OR first_name ILIKE $6 OR last_name ILIKE $6
                    OR email ILIKE $6 OR company ILIKE $6 OR phone ILIKE $6)
             ORDER BY created_at DESC, id DESC
             LIMIT $7 OFFSET $8"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(&filter.status)
            .bind(&filter.source)
            .bind(&filter.priority)
            .bind(filter.assigned_to)
            .bind(filter.visible_to)
            .bind(pattern)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Patch a lead. `closed_at` is written only when the patch sets `status`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLead,
        closed_at: Option<Timestamp>,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!(
            "UPDATE leads SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                company = COALESCE($6, company),
                source = COALESCE($7, source),
                status = COALESCE($8, status),
                priority = COALESCE($9, priority),
                estimated_value_cents = COALESCE($10, estimated_value_cents),
                assigned_to = COALESCE($11, assigned_to),
                closed_at = CASE WHEN $8::TEXT IS NULL THEN closed_at ELSE $12 END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.source)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.estimated_value_cents)
            .bind(input.assigned_to)
            .bind(closed_at)
            .fetch_optional(pool)
            .await
    }

    /// Assign a lead to a user, or unassign it with `None`.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        user_id: Option<DbId>,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("UPDATE leads SET assigned_to = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the next follow-up time.
    pub async fn set_follow_up(
        pool: &PgPool,
        id: DbId,
        at: Option<Timestamp>,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query =
            format!("UPDATE leads SET next_follow_up_at = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed. Notes cascade; linked tasks are unlinked.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Open leads whose follow-up time has passed, earliest first.
    pub async fn due_follow_ups(
        pool: &PgPool,
        visible_to: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leads
             WHERE closed_at IS NULL
               AND next_follow_up_at <= NOW()
               AND ($1::BIGINT IS NULL OR assigned_to = $1)
             ORDER BY next_follow_up_at ASC, id ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(visible_to)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
