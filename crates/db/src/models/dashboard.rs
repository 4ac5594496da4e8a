//! Dashboard summary payloads.

use serde::Serialize;
use sqlx::FromRow;

/// Article counts by publication state.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ArticleCounts {
    pub draft: i64,
    pub scheduled: i64,
    pub published: i64,
}

/// Number of leads in one pipeline status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Counts of the caller's open work.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct TaskCounts {
    pub open: i64,
    pub overdue: i64,
}

/// Everything shown on the admin landing page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub articles: ArticleCounts,
    pub leads_by_status: Vec<StatusCount>,
    pub follow_ups_due: i64,
    pub my_tasks: TaskCounts,
}
