//! Repository for the `permissions` table and effective-permission lookups.

use std::collections::HashMap;

use pressdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::permission::{CreatePermission, Permission, RolePermissionRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides CRUD operations for permissions.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Insert a permission, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePermission,
    ) -> Result<Permission, sqlx::Error> {
        let query = format!(
            "INSERT INTO permissions (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Permission>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// List all permissions alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions ORDER BY name ASC");
        sqlx::query_as::<_, Permission>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions WHERE id = $1");
        sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a permission by name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions WHERE name = $1");
        sqlx::query_as::<_, Permission>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a permission; grants cascade. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permissions granted to one role, alphabetically.
    pub async fn list_for_role(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<Permission>, sqlx::Error> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.name, p.description, p.created_at, p.updated_at
             FROM permissions p
             JOIN role_permissions rp ON rp.permission_id = p.id
             WHERE rp.role_id = $1
             ORDER BY p.name ASC",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await
    }

    /// Every role's permissions, keyed by role id.
    pub async fn list_grouped_by_role(
        pool: &PgPool,
    ) -> Result<HashMap<DbId, Vec<Permission>>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            "SELECT rp.role_id, p.id, p.name, p.description, p.created_at, p.updated_at
             FROM role_permissions rp
             JOIN permissions p ON p.id = rp.permission_id
             ORDER BY p.name ASC",
        )
        .fetch_all(pool)
        .await?;

        let mut map: HashMap<DbId, Vec<Permission>> = HashMap::new();
        for row in rows {
            map.entry(row.role_id).or_default().push(row.into());
        }
        Ok(map)
    }

    /// Distinct permission names a user holds through any of their roles.
    pub async fn names_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT p.name
             FROM user_roles ur
             JOIN role_permissions rp ON rp.role_id = ur.role_id
             JOIN permissions p ON p.id = rp.permission_id
             WHERE ur.user_id = $1
             ORDER BY p.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
