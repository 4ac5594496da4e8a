//! Role entity model and DTOs.

use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::permission::Permission;

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Protected roles cannot be renamed, re-permissioned, or deleted.
    pub is_protected: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A role together with the permissions granted to it.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub user_count: i64,
}

/// DTO for inserting a role.
#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating a role. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `(user_id, role name)` pair used to resolve roles for many users at once.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleName {
    pub user_id: DbId,
    pub name: String,
}
