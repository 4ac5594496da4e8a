//! Handlers for `/roles` and `/permissions`. All require `roles.manage`.
//!
//! Role writes upsert the role row and sync `role_permissions` in a single
//! transaction; unknown permission ids roll the whole write back.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pressdesk_core::error::CoreError;
use pressdesk_core::permissions::{
    is_builtin_permission, validate_permission_name, validate_role_name,
};
use pressdesk_core::sync::SyncResult;
use pressdesk_core::types::DbId;
use pressdesk_core::validation::max_len;
use pressdesk_db::models::permission::{CreatePermission, Permission};
use pressdesk_db::models::role::{CreateRole, Role, RoleWithPermissions, UpdateRole};
use pressdesk_db::repositories::{PermissionRepo, RoleRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequirePermission, RolesManage};
use crate::response::{DataResponse, SyncedResponse};
use crate::state::AppState;

const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Request body for `POST /roles`.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<DbId>,
}

/// Request body for `PUT /roles/{id}`. Omitted `permission_ids` leaves grants untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<DbId>>,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// GET /api/v1/roles
pub async fn list_roles(
    State(state): State<AppState>,
    _auth: RequirePermission<RolesManage>,
) -> AppResult<Json<DataResponse<Vec<RoleWithPermissions>>>> {
    let roles = RoleRepo::list_with_permissions(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// POST /api/v1/roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: RequirePermission<RolesManage>,
    Json(input): Json<CreateRoleRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RoleWithPermissions>>)> {
    validate_role_name(&input.name)?;
    validate_description(input.description.as_deref())?;

    let create = CreateRole {
        name: input.name,
        description: input.description,
    };
    let role = RoleRepo::create_with_permissions(&state.pool, &create, &input.permission_ids).await?;

    tracing::info!(
        role_id = role.id,
        role = %role.name,
        permissions = input.permission_ids.len(),
        created_by = auth.user_id(),
        "Role created"
    );
    let data = load_role(&state, role.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    _auth: RequirePermission<RolesManage>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RoleWithPermissions>>> {
    let data = load_role(&state, id).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/roles/{id}
///
/// Responds with the updated role and the permission ids attached and
/// detached by the sync.
pub async fn update_role(
    State(state): State<AppState>,
    auth: RequirePermission<RolesManage>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<SyncedResponse<RoleWithPermissions>>>> {
    if let Some(name) = &input.name {
        validate_role_name(name)?;
    }
    validate_description(input.description.as_deref())?;

    let existing = find_role(&state, id).await?;
    if existing.is_protected {
        let renames = input.name.as_ref().is_some_and(|n| *n != existing.name);
        if renames || input.permission_ids.is_some() {
            return Err(protected_role(&existing));
        }
    }

    let update = UpdateRole {
        name: input.name,
        description: input.description,
    };
    let (role, plan) = RoleRepo::update_with_permissions(
        &state.pool,
        id,
        &update,
        input.permission_ids.as_deref(),
    )
    .await?
    .ok_or(CoreError::NotFound { entity: "Role", id })?;

    tracing::info!(
        role_id = id,
        role = %role.name,
        attached = plan.attach.len(),
        detached = plan.detach.len(),
        updated_by = auth.user_id(),
        "Role updated"
    );
    let data = load_role(&state, id).await?;
    Ok(Json(DataResponse {
        data: SyncedResponse {
            entity: data,
            sync: SyncResult::from(plan),
        },
    }))
}

/// DELETE /api/v1/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: RequirePermission<RolesManage>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let role = find_role(&state, id).await?;
    if role.is_protected {
        return Err(protected_role(&role));
    }
    RoleRepo::delete(&state.pool, id).await?;
    tracing::info!(role_id = id, role = %role.name, deleted_by = auth.user_id(), "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// GET /api/v1/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    _auth: RequirePermission<RolesManage>,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    let permissions = PermissionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: permissions }))
}

/// POST /api/v1/permissions
pub async fn create_permission(
    State(state): State<AppState>,
    auth: RequirePermission<RolesManage>,
    Json(input): Json<CreatePermission>,
) -> AppResult<(StatusCode, Json<DataResponse<Permission>>)> {
    validate_permission_name(&input.name)?;
    validate_description(input.description.as_deref())?;

    let permission = PermissionRepo::create(&state.pool, &input).await?;
    tracing::info!(
        permission_id = permission.id,
        permission = %permission.name,
        created_by = auth.user_id(),
        "Permission created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: permission })))
}

/// DELETE /api/v1/permissions/{id}
///
/// Grants of the permission are removed with it. Built-in permissions are
/// refused with 409.
pub async fn delete_permission(
    State(state): State<AppState>,
    auth: RequirePermission<RolesManage>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Permission",
            id,
        })
    };
    let permission = PermissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    if is_builtin_permission(&permission.name) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Permission '{}' is built in and cannot be deleted",
            permission.name
        ))));
    }

    if !PermissionRepo::delete(&state.pool, id).await? {
        return Err(not_found());
    }
    tracing::info!(
        permission_id = id,
        permission = %permission.name,
        deleted_by = auth.user_id(),
        "Permission deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_role(state: &AppState, id: DbId) -> AppResult<Role> {
    RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Role", id }))
}

async fn load_role(state: &AppState, id: DbId) -> AppResult<RoleWithPermissions> {
    RoleRepo::find_with_permissions(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Role", id }))
}

fn protected_role(role: &Role) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Role '{}' is protected and cannot be renamed, re-permissioned, or deleted",
        role.name
    )))
}

fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    match description {
        Some(d) => max_len("Description", d, MAX_DESCRIPTION_LENGTH),
        None => Ok(()),
    }
}
