//! Handlers for the `/users` resource. All require `users.manage`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pressdesk_core::error::CoreError;
use pressdesk_core::permissions::ROLE_SUPER_ADMIN;
use pressdesk_core::sync::{plan_sync, SyncResult};
use pressdesk_core::types::DbId;
use pressdesk_core::validation::{require_text, validate_email};
use pressdesk_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use pressdesk_db::repositories::{RoleRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::revoke_sessions;
use crate::middleware::rbac::{Authorized, RequirePermission, UsersManage};
use crate::query::{non_blank, resolve_page, SearchParams};
use crate::response::{DataResponse, SyncedResponse};
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role_ids: Vec<DbId>,
}

/// Request body for `PUT /users/{id}`. Omitted `role_ids` leaves roles as they are.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub role_ids: Option<Vec<DbId>>,
}

/// Request body for `POST /users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    _auth: RequirePermission<UsersManage>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let users = UserRepo::list(&state.pool, non_blank(params.q.as_deref()), limit, offset).await?;

    let ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
    let mut roles = RoleRepo::names_for_users(&state.pool, &ids).await?;
    let data = users
        .iter()
        .map(|u| UserResponse::from_user(u, roles.remove(&u.id).unwrap_or_default()))
        .collect();

    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/users
///
/// Creates the account and its role assignments in one transaction.
pub async fn create_user(
    State(state): State<AppState>,
    auth: RequirePermission<UsersManage>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    require_text("Name", &input.name, MAX_NAME_LENGTH)?;
    let email = normalize_email(&input.email)?;
    validate_password_strength(&input.password)?;
    guard_super_admin_change(&state, &auth, &[], &input.role_ids).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let create = CreateUser {
        name: input.name.trim().to_string(),
        email,
        password_hash,
    };
    let user = UserRepo::create_with_roles(&state.pool, &create, &input.role_ids).await?;

    tracing::info!(user_id = user.id, created_by = auth.user_id(), "User created");
    let response = user_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: RequirePermission<UsersManage>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    let response = user_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// PUT /api/v1/users/{id}
///
/// Updates profile fields and, when `role_ids` is present, replaces the
/// role set. Both happen in one transaction.
pub async fn update_user(
    State(state): State<AppState>,
    auth: RequirePermission<UsersManage>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<SyncedResponse<UserResponse>>>> {
    if let Some(name) = &input.name {
        require_text("Name", name, MAX_NAME_LENGTH)?;
    }
    let email = input.email.as_deref().map(normalize_email).transpose()?;
    if input.is_active == Some(false) && id == auth.user_id() {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }

    find_user(&state, id).await?;
    let current = RoleRepo::ids_for_user(&state.pool, id).await?;
    if !auth.is_super_admin() && holds_super_admin(&state, &current).await? {
        return Err(super_admin_forbidden());
    }
    if let Some(desired) = &input.role_ids {
        guard_super_admin_change(&state, &auth, &current, desired).await?;
    }

    let update = UpdateUser {
        name: input.name.map(|n| n.trim().to_string()),
        email,
        is_active: input.is_active,
    };
    let (user, plan) = UserRepo::update_with_roles(&state.pool, id, &update, input.role_ids.as_deref())
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    if !user.is_active {
        revoke_sessions(&state, id).await?;
    }

    tracing::info!(
        user_id = id,
        updated_by = auth.user_id(),
        roles_attached = plan.attach.len(),
        roles_detached = plan.detach.len(),
        "User updated"
    );
    let response = user_response(&state, &user).await?;
    Ok(Json(DataResponse {
        data: SyncedResponse {
            entity: response,
            sync: SyncResult::from(plan),
        },
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Deactivates the account and revokes its sessions. Rows are kept so that
/// authored content and notes stay attributed.
pub async fn deactivate_user(
    State(state): State<AppState>,
    auth: RequirePermission<UsersManage>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == auth.user_id() {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }
    let user = find_user(&state, id).await?;
    let current = RoleRepo::ids_for_user(&state.pool, id).await?;
    if !auth.is_super_admin() && holds_super_admin(&state, &current).await? {
        return Err(super_admin_forbidden());
    }

    if user.is_active {
        UserRepo::deactivate(&state.pool, id).await?;
    }
    let revoked = revoke_sessions(&state, id).await?;

    tracing::info!(user_id = id, deactivated_by = auth.user_id(), revoked, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/{id}/reset-password
///
/// Sets a new password, clears any lockout, and signs the user out everywhere.
pub async fn reset_password(
    State(state): State<AppState>,
    auth: RequirePermission<UsersManage>,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password)?;
    find_user(&state, id).await?;

    let current = RoleRepo::ids_for_user(&state.pool, id).await?;
    if !auth.is_super_admin() && holds_super_admin(&state, &current).await? {
        return Err(super_admin_forbidden());
    }

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    UserRepo::update_password(&state.pool, id, &password_hash).await?;
    revoke_sessions(&state, id).await?;

    tracing::info!(user_id = id, reset_by = auth.user_id(), "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "User", id }))
}

async fn user_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let roles = RoleRepo::names_for_user(&state.pool, user.id).await?;
    Ok(UserResponse::from_user(user, roles))
}

/// Trim and lowercase an email, then validate it.
fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    validate_email("Email", &email)?;
    Ok(email)
}

fn super_admin_forbidden() -> AppError {
    AppError::Core(CoreError::Forbidden(format!(
        "Only a {ROLE_SUPER_ADMIN} can manage {ROLE_SUPER_ADMIN} accounts"
    )))
}

async fn super_admin_role_id(state: &AppState) -> AppResult<Option<DbId>> {
    Ok(RoleRepo::find_by_name(&state.pool, ROLE_SUPER_ADMIN)
        .await?
        .map(|r| r.id))
}

async fn holds_super_admin(state: &AppState, role_ids: &[DbId]) -> AppResult<bool> {
    Ok(super_admin_role_id(state)
        .await?
        .is_some_and(|id| role_ids.contains(&id)))
}

/// Only a super-admin may grant or revoke the super-admin role.
async fn guard_super_admin_change(
    state: &AppState,
    auth: &Authorized,
    current: &[DbId],
    desired: &[DbId],
) -> AppResult<()> {
    if auth.is_super_admin() {
        return Ok(());
    }
    let Some(super_id) = super_admin_role_id(state).await? else {
        return Ok(());
    };
    let plan = plan_sync(current, desired);
    if plan.attach.contains(&super_id) || plan.detach.contains(&super_id) {
        return Err(super_admin_forbidden());
    }
    Ok(())
}
