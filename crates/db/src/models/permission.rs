//! Permission entity model.

use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a permission.
#[derive(Debug, Deserialize)]
pub struct CreatePermission {
    pub name: String,
    pub description: Option<String>,
}

/// `(role_id, permission)` pair used to attach permissions to many roles at once.
#[derive(Debug, Clone, FromRow)]
pub struct RolePermissionRow {
    pub role_id: DbId,
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<RolePermissionRow> for Permission {
    fn from(row: RolePermissionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
