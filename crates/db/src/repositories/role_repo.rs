//! Repository for the `roles` table, its `role_permissions` grants, and
//! role lookups for users.

use std::collections::HashMap;

use pressdesk_core::sync::SyncPlan;
use pressdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::permission::Permission;
use crate::models::role::{CreateRole, Role, RoleWithPermissions, UpdateRole, UserRoleName};
use crate::repositories::permission_repo::PermissionRepo;
use crate::repositories::sync::{sync_join, SyncError, ROLE_PERMISSIONS};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, is_protected, created_at, updated_at";

/// Provides CRUD operations for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// List all roles with their permissions and assigned-user counts.
    ///
    /// Uses two extra queries in total rather than one per role.
    pub async fn list_with_permissions(
        pool: &PgPool,
    ) -> Result<Vec<RoleWithPermissions>, sqlx::Error> {
        let roles = Self::list(pool).await?;
        let mut grants = PermissionRepo::list_grouped_by_role(pool).await?;
        let counts: HashMap<DbId, i64> = sqlx::query_as::<_, (DbId, i64)>(
            "SELECT role_id, COUNT(*) FROM user_roles GROUP BY role_id",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .collect();

        Ok(roles
            .into_iter()
            .map(|role| RoleWithPermissions {
                permissions: grants.remove(&role.id).unwrap_or_default(),
                user_count: counts.get(&role.id).copied().unwrap_or(0),
                role,
            })
            .collect())
    }

    /// Load one role with its permissions and assigned-user count.
    pub async fn find_with_permissions(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RoleWithPermissions>, sqlx::Error> {
        let Some(role) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let permissions = PermissionRepo::list_for_role(pool, id).await?;
        let user_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(Some(RoleWithPermissions {
            role,
            permissions,
            user_count,
        }))
    }

    /// Insert a role and grant `permission_ids` in a single transaction.
    pub async fn create_with_permissions(
        pool: &PgPool,
        input: &CreateRole,
        permission_ids: &[DbId],
    ) -> Result<Role, SyncError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO roles (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        sync_join(&mut tx, ROLE_PERMISSIONS, role.id, permission_ids).await?;

        tx.commit().await?;
        Ok(role)
    }

    /// Update a role and, when `permission_ids` is `Some`, re-sync its grants,
    /// all in one transaction. The role row is locked for the duration so
    /// concurrent syncs of the same role serialize.
    ///
    /// Returns `Ok(None)` if no row with the given `id` exists.
    pub async fn update_with_permissions(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRole,
        permission_ids: Option<&[DbId]>,
    ) -> Result<Option<(Role, SyncPlan)>, SyncError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> = sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let query = format!(
            "UPDATE roles SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        let plan = match permission_ids {
            Some(ids) => sync_join(&mut tx, ROLE_PERMISSIONS, id, ids).await?,
            None => SyncPlan::default(),
        };

        tx.commit().await?;
        Ok(Some((role, plan)))
    }

    /// Delete a role. Assignments and grants cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Role names assigned to a user, alphabetically.
    pub async fn names_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT r.name FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Role names for many users at once, keyed by user id.
    pub async fn names_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<String>>, sqlx::Error> {
        let rows = sqlx::query_as::<_, UserRoleName>(
            "SELECT ur.user_id, r.name FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ANY($1)
             ORDER BY r.name ASC",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await?;

        let mut map: HashMap<DbId, Vec<String>> = HashMap::new();
        for row in rows {
            map.entry(row.user_id).or_default().push(row.name);
        }
        Ok(map)
    }

    /// Role ids currently assigned to a user.
    pub async fn ids_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Permissions granted to a role, by name.
    pub async fn permissions(pool: &PgPool, role_id: DbId) -> Result<Vec<Permission>, sqlx::Error> {
        PermissionRepo::list_for_role(pool, role_id).await
    }
}
