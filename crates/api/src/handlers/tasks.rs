//! Handlers for `/tasks`.
//!
//! Holders of `tasks.manage` see and edit every task. Everyone else sees the
//! tasks assigned to or created by them and may only move the status of
//! tasks assigned to them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pressdesk_core::error::CoreError;
use pressdesk_core::leads::validate_priority;
use pressdesk_core::permissions::PERM_TASKS_MANAGE;
use pressdesk_core::tasks::{
    resolve_completed_at, validate_description, validate_status, validate_title, STATUS_PENDING,
};
use pressdesk_core::types::DbId;
use pressdesk_db::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use pressdesk_db::repositories::{LeadRepo, TaskRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Authorized, RequirePermission, TasksManage, TasksView};
use crate::query::{non_blank, resolve_page};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<DbId>,
    pub lead_id: Option<DbId>,
    pub overdue: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: RequirePermission<TasksView>,
    Query(params): Query<TaskListParams>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let status = non_blank(params.status.as_deref());
    let priority = non_blank(params.priority.as_deref());
    status.map(validate_status).transpose()?;
    priority.map(validate_priority).transpose()?;
    let (limit, offset) = resolve_page(params.limit, params.offset);

    let filter = TaskFilter {
        status: status.map(str::to_string),
        priority: priority.map(str::to_string),
        assigned_to: params.assigned_to,
        lead_id: params.lead_id,
        overdue: params.overdue,
        visible_to: task_scope(&auth),
        limit,
        offset,
    };
    let tasks = TaskRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: RequirePermission<TasksView>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    validate_title(&input.title)?;
    validate_fields(
        input.description.as_deref(),
        input.status.as_deref(),
        input.priority.as_deref(),
    )?;

    let assigned_to = input.assigned_to.unwrap_or(auth.user_id());
    if assigned_to != auth.user_id() {
        auth.require(PERM_TASKS_MANAGE)?;
        ensure_user_exists(&state, assigned_to).await?;
    }
    if let Some(lead_id) = input.lead_id {
        ensure_lead_exists(&state, lead_id).await?;
    }

    let status = input.status.as_deref().unwrap_or(STATUS_PENDING);
    let completed_at = resolve_completed_at(status, None, Utc::now());
    let task =
        TaskRepo::create(&state.pool, &input, Some(assigned_to), auth.user_id(), completed_at)
            .await?;

    tracing::info!(
        task_id = task.id,
        assigned_to,
        lead_id = ?task.lead_id,
        user_id = auth.user_id(),
        "Task created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: RequirePermission<TasksView>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = find_visible_task(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// PUT /api/v1/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    auth: RequirePermission<TasksView>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<DataResponse<Task>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    validate_fields(
        input.description.as_deref(),
        input.status.as_deref(),
        input.priority.as_deref(),
    )?;

    let existing = find_visible_task(&state, &auth, id).await?;
    if !auth.can(PERM_TASKS_MANAGE) {
        if existing.assigned_to != Some(auth.user_id()) {
            return Err(forbidden("Only the assignee may update this task"));
        }
        if !input.is_status_only() {
            return Err(forbidden("Only the status of an assigned task may be changed"));
        }
    }
    if let Some(assignee) = input.assigned_to {
        ensure_user_exists(&state, assignee).await?;
    }
    if let Some(lead_id) = input.lead_id {
        ensure_lead_exists(&state, lead_id).await?;
    }

    let completed_at = input
        .status
        .as_deref()
        .and_then(|status| resolve_completed_at(status, existing.completed_at, Utc::now()));
    let task = TaskRepo::update(&state.pool, id, &input, completed_at)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        task_id = id,
        status = %task.status,
        user_id = auth.user_id(),
        "Task updated"
    );
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/complete
pub async fn complete_task(
    State(state): State<AppState>,
    auth: RequirePermission<TasksView>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    let existing = find_visible_task(&state, &auth, id).await?;
    if existing.assigned_to != Some(auth.user_id()) {
        auth.require(PERM_TASKS_MANAGE)?;
    }

    let task = TaskRepo::complete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(task_id = id, user_id = auth.user_id(), "Task completed");
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    auth: RequirePermission<TasksManage>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(task_id = id, user_id = auth.user_id(), "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn task_scope(auth: &Authorized) -> Option<DbId> {
    if auth.can(PERM_TASKS_MANAGE) {
        None
    } else {
        Some(auth.user_id())
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.into()))
}

async fn find_visible_task(state: &AppState, auth: &Authorized, id: DbId) -> AppResult<Task> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    match task_scope(auth) {
        Some(user_id)
            if task.assigned_to != Some(user_id) && task.created_by != Some(user_id) =>
        {
            Err(not_found(id))
        }
        _ => Ok(task),
    }
}

fn validate_fields(
    description: Option<&str>,
    status: Option<&str>,
    priority: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(description) = description {
        validate_description(description)?;
    }
    if let Some(status) = status {
        validate_status(status)?;
    }
    if let Some(priority) = priority {
        validate_priority(priority)?;
    }
    Ok(())
}

async fn ensure_user_exists(state: &AppState, user_id: DbId) -> AppResult<()> {
    if UserRepo::find_by_id(&state.pool, user_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "User with id {user_id} does not exist"
        )));
    }
    Ok(())
}

async fn ensure_lead_exists(state: &AppState, lead_id: DbId) -> AppResult<()> {
    if LeadRepo::find_by_id(&state.pool, lead_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Lead with id {lead_id} does not exist"
        )));
    }
    Ok(())
}
