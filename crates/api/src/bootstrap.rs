//! First-run creation of a `super-admin` account.

use pressdesk_core::error::CoreError;
use pressdesk_core::permissions::ROLE_SUPER_ADMIN;
use pressdesk_core::validation::validate_email;
use pressdesk_db::models::user::{CreateUser, User};
use pressdesk_db::repositories::{RoleRepo, UserRepo};
use sqlx::PgPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

const BOOTSTRAP_NAME: &str = "Administrator";

/// Create the configured admin when the users table is empty.
///
/// Returns the new user, or `None` when nothing was configured or users
/// already exist.
pub async fn ensure_admin(
    pool: &PgPool,
    admin: Option<&BootstrapAdmin>,
) -> AppResult<Option<User>> {
    let Some(admin) = admin else {
        return Ok(None);
    };
    if UserRepo::count(pool).await? > 0 {
        tracing::debug!("Users exist, skipping admin bootstrap");
        return Ok(None);
    }

    let email = admin.email.trim().to_lowercase();
    validate_email("BOOTSTRAP_ADMIN_EMAIL", &email)?;
    validate_password_strength(&admin.password)?;

    let role = RoleRepo::find_by_name(pool, ROLE_SUPER_ADMIN)
        .await?
        .ok_or_else(|| {
            CoreError::Internal(format!("Role '{ROLE_SUPER_ADMIN}' is missing from the seed data"))
        })?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    let input = CreateUser {
        name: BOOTSTRAP_NAME.to_string(),
        email,
        password_hash,
    };
    let user = UserRepo::create_with_roles(pool, &input, &[role.id]).await?;

    tracing::info!(user_id = user.id, email = %user.email, "Bootstrapped super-admin account");
    Ok(Some(user))
}
