//! Repository for the `tasks` table.

use pressdesk_core::leads::PRIORITY_MEDIUM;
use pressdesk_core::tasks::{STATUS_COMPLETED, STATUS_PENDING};
use pressdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, priority, due_at, assigned_to, lead_id, \
                        created_by, completed_at, created_at, updated_at";

/// SQL predicate for an open task past its due time.
const OVERDUE: &str =
    "(status IN ('pending', 'in_progress') AND COALESCE(due_at < NOW(), FALSE))";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task. Missing status and priority default to `pending` and `medium`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTask,
        assigned_to: Option<DbId>,
        created_by: DbId,
        completed_at: Option<Timestamp>,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (title, description, status, priority, due_at, assigned_to, lead_id,
                 created_by, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.as_deref().unwrap_or(STATUS_PENDING))
            .bind(input.priority.as_deref().unwrap_or(PRIORITY_MEDIUM))
            .bind(input.due_at)
            .bind(assigned_to)
            .bind(input.lead_id)
            .bind(created_by)
            .bind(completed_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered task list ordered by due time, undated tasks last.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR priority = $2)
               AND ($3::BIGINT IS NULL OR assigned_to = $3)
               AND ($4::BIGINT IS NULL OR lead_id = $4)
               AND ($5::BOOLEAN IS NULL OR $5 = {OVERDUE})
               AND ($6::BIGINT IS NULL OR assigned_to = $6 OR created_by = $6)
             ORDER BY due_at ASC NULLS LAST, id ASC
             LIMIT $7 OFFSET $8"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&filter.status)
            .bind(&filter.priority)
            .bind(filter.assigned_to)
            .bind(filter.lead_id)
            .bind(filter.overdue)
            .bind(filter.visible_to)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Patch a task. `completed_at` is written only when the patch sets `status`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
        completed_at: Option<Timestamp>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                due_at = COALESCE($6, due_at),
                assigned_to = COALESCE($7, assigned_to),
                lead_id = COALESCE($8, lead_id),
                completed_at = CASE WHEN $4::TEXT IS NULL THEN completed_at ELSE $9 END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.due_at)
            .bind(input.assigned_to)
            .bind(input.lead_id)
            .bind(completed_at)
            .fetch_optional(pool)
            .await
    }

    /// Mark a task completed, keeping an earlier completion time if present.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status = $2, completed_at = COALESCE(completed_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(STATUS_COMPLETED)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Open and overdue task counts for one assignee.
    pub async fn counts_for_assignee(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        let query = format!(
            "SELECT
                COUNT(*) FILTER (WHERE status IN ('pending', 'in_progress')),
                COUNT(*) FILTER (WHERE {OVERDUE})
             FROM tasks
             WHERE assigned_to = $1"
        );
        sqlx::query_as::<_, (i64, i64)>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
