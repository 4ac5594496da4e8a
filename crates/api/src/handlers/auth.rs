//! Handlers for the `/auth` resource (login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use pressdesk_core::error::CoreError;
use pressdesk_core::types::DbId;
use pressdesk_db::models::session::NewRefreshSession;
use pressdesk_db::models::user::{User, UserResponse};
use pressdesk_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

/// Wrong passwords in a row that lock an account.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;
/// How long a lock lasts.
pub const LOCK_DURATION_MINS: i64 = 15;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub permissions: Vec<String>,
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(account_deactivated());
    }
    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let lock_until = Utc::now() + Duration::minutes(LOCK_DURATION_MINS);
        let failed =
            UserRepo::record_failed_login(&state.pool, user.id, MAX_FAILED_ATTEMPTS, lock_until).await?;
        if failed.failures >= MAX_FAILED_ATTEMPTS {
            tracing::warn!(user_id = user.id, failures = failed.failures, "Account locked after failed logins");
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    let (refresh_token, session) = new_session(&state, user.id, &headers);
    SessionRepo::create(&state.pool, &session).await?;
    let response = token_pair(&state, &user, refresh_token).await?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auth/refresh
///
/// Trade a refresh token for a fresh pair. The presented token is spent
/// whether or not the caller keeps the new one; replaying it is a 401.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let presented = hash_refresh_token(&input.refresh_token);
    let current = SessionRepo::find_active(&state.pool, &presented)
        .await?
        .ok_or_else(invalid_refresh_token)?;

    let user = UserRepo::find_by_id(&state.pool, current.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    if !user.is_active {
        return Err(account_deactivated());
    }

    let (refresh_token, next) = new_session(&state, user.id, &headers);
    let rotated = SessionRepo::rotate(&state.pool, current.id, &next)
        .await?
        .ok_or_else(invalid_refresh_token)?;

    tracing::debug!(user_id = user.id, from = current.id, to = rotated.id, "Refresh session rotated");
    let response = token_pair(&state, &user, refresh_token).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// The caller's account, current role names, and effective permissions.
pub async fn me(
    State(state): State<AppState>,
    auth: Authorized,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id())
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth.user_id(),
        })?;

    Ok(Json(DataResponse {
        data: MeResponse {
            user: UserResponse::from_user(&user, auth.roles.clone()),
            permissions: auth.permission_names(),
        },
    }))
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

fn invalid_refresh_token() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid or expired refresh token".into(),
    ))
}

fn account_deactivated() -> AppError {
    AppError::Core(CoreError::Forbidden("Account is deactivated".into()))
}

/// A new refresh token and the session row that will hold its hash.
fn new_session(state: &AppState, user_id: DbId, headers: &HeaderMap) -> (String, NewRefreshSession) {
    let (plaintext, hash) = generate_refresh_token();
    let client_ip = header_value(headers, "x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next().map(|ip| ip.trim().to_owned()));
    let session = NewRefreshSession {
        user_id,
        refresh_token_hash: hash,
        expires_at: Utc::now() + Duration::days(state.config.jwt.refresh_token_expiry_days),
        user_agent: header_value(headers, USER_AGENT.as_str()),
        ip_address: client_ip,
    };
    (plaintext, session)
}

async fn token_pair(state: &AppState, user: &User, refresh_token: String) -> AppResult<AuthResponse> {
    let roles = RoleRepo::names_for_user(&state.pool, user.id).await?;
    let access_token = generate_access_token(user.id, &roles, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: UserResponse::from_user(user, roles),
    })
}

/// Header value as text, capped at 512 chars.
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.chars().take(512).collect())
}

/// Used by the user handlers when a password is reset.
pub(crate) async fn revoke_sessions(state: &AppState, user_id: DbId) -> AppResult<u64> {
    Ok(SessionRepo::revoke_all_for_user(&state.pool, user_id).await?)
}
