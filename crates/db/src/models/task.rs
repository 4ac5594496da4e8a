//! Task entity model, DTOs, and list filters.

use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_at: Option<Timestamp>,
    pub assigned_to: Option<DbId>,
    pub lead_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task.
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_at: Option<Timestamp>,
    pub assigned_to: Option<DbId>,
    pub lead_id: Option<DbId>,
}

/// DTO for updating a task. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_at: Option<Timestamp>,
    pub assigned_to: Option<DbId>,
    pub lead_id: Option<DbId>,
}

impl UpdateTask {
    /// True when only `status` is set.
    pub fn is_status_only(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_at.is_none()
            && self.assigned_to.is_none()
            && self.lead_id.is_none()
    }
}

/// Filters for the task list.
#[derive(Debug, Default)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<DbId>,
    pub lead_id: Option<DbId>,
    pub overdue: Option<bool>,
    /// Restrict to tasks assigned to or created by this user (`None` = all).
    pub visible_to: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}
