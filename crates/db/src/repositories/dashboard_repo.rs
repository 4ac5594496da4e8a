//! Aggregate queries behind the admin dashboard.

use pressdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{ArticleCounts, DashboardSummary, StatusCount, TaskCounts};
use crate::repositories::task_repo::TaskRepo;

/// Read-only dashboard aggregates.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Article counts by publication state.
    pub async fn article_counts(pool: &PgPool) -> Result<ArticleCounts, sqlx::Error> {
        sqlx::query_as::<_, ArticleCounts>(
            "SELECT
                COUNT(*) FILTER (WHERE NOT is_published) AS draft,
                COUNT(*) FILTER (WHERE is_published AND published_at > NOW()) AS scheduled,
                COUNT(*) FILTER (WHERE is_published AND published_at <= NOW()) AS published
             FROM articles",
        )
        .fetch_one(pool)
        .await
    }

    /// Lead counts per status, restricted to `visible_to` when set.
    pub async fn lead_status_counts(
        pool: &PgPool,
        visible_to: Option<DbId>,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count
             FROM leads
             WHERE ($1::BIGINT IS NULL OR assigned_to = $1)
             GROUP BY status
             ORDER BY status ASC",
        )
        .bind(visible_to)
        .fetch_all(pool)
        .await
    }

    /// Number of open leads whose follow-up time has passed.
    pub async fn follow_ups_due(
        pool: &PgPool,
        visible_to: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM leads
             WHERE closed_at IS NULL
               AND next_follow_up_at <= NOW()
               AND ($1::BIGINT IS NULL OR assigned_to = $1)",
        )
        .bind(visible_to)
        .fetch_one(pool)
        .await
    }

    /// Assemble the full summary for `user_id`.
    ///
    /// `lead_scope` is `None` for callers who see every lead. Sections the
    /// caller may not view are left empty.
    pub async fn summary(
        pool: &PgPool,
        user_id: DbId,
        include_articles: bool,
        include_leads: bool,
        lead_scope: Option<DbId>,
    ) -> Result<DashboardSummary, sqlx::Error> {
        let articles = if include_articles {
            Self::article_counts(pool).await?
        } else {
            ArticleCounts::default()
        };
        let (leads_by_status, follow_ups_due) = if include_leads {
            (
                Self::lead_status_counts(pool, lead_scope).await?,
                Self::follow_ups_due(pool, lead_scope).await?,
            )
        } else {
            (Vec::new(), 0)
        };
        let (open, overdue) = TaskRepo::counts_for_assignee(pool, user_id).await?;

        Ok(DashboardSummary {
            articles,
            leads_by_status,
            follow_ups_due,
            my_tasks: TaskCounts { open, overdue },
        })
    }
}
