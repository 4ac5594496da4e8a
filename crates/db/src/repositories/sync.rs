//! Transactional many-to-many synchronization for `role_permissions` and
//! `user_roles`.

use pressdesk_core::sync::{plan_sync, unknown_ids, SyncPlan};
use pressdesk_core::types::DbId;
use sqlx::PgConnection;

/// Failure while syncing a join table.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Some requested related ids do not exist. Nothing was written.
    #[error("Unknown {entity} ids: {ids:?}")]
    UnknownIds { entity: &'static str, ids: Vec<DbId> },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A join table linking an owner row to related rows.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JoinTable {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub related_column: &'static str,
    /// Table holding the related rows, checked for unknown ids.
    pub related_table: &'static str,
    /// Entity label used in [`SyncError::UnknownIds`].
    pub related_entity: &'static str,
}

pub(crate) const ROLE_PERMISSIONS: JoinTable = JoinTable {
    table: "role_permissions",
    owner_column: "role_id",
    related_column: "permission_id",
    related_table: "permissions",
    related_entity: "permission",
};

pub(crate) const USER_ROLES: JoinTable = JoinTable {
    table: "user_roles",
    owner_column: "user_id",
    related_column: "role_id",
    related_table: "roles",
    related_entity: "role",
};

/// Replace the related ids of `owner_id` with `desired` on an open transaction.
///
/// Verifies every desired id exists, then deletes the detached rows and
/// inserts the attached ones. The caller commits or drops the transaction.
pub(crate) async fn sync_join(
    conn: &mut PgConnection,
    join: JoinTable,
    owner_id: DbId,
    desired: &[DbId],
) -> Result<SyncPlan, SyncError> {
    let known_query = format!(
        "SELECT id FROM {} WHERE id = ANY($1)",
        join.related_table
    );
    let known: Vec<DbId> = sqlx::query_scalar(&known_query)
        .bind(desired)
        .fetch_all(&mut *conn)
        .await?;
    let missing = unknown_ids(desired, &known);
    if !missing.is_empty() {
        return Err(SyncError::UnknownIds {
            entity: join.related_entity,
            ids: missing,
        });
    }

    let current_query = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        join.related_column, join.table, join.owner_column
    );
    let current: Vec<DbId> = sqlx::query_scalar(&current_query)
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await?;

    let plan = plan_sync(&current, desired);
    if plan.is_noop() {
        return Ok(plan);
    }

    if !plan.detach.is_empty() {
        let delete_query = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = ANY($2)",
            join.table, join.owner_column, join.related_column
        );
        sqlx::query(&delete_query)
            .bind(owner_id)
            .bind(&plan.detach)
            .execute(&mut *conn)
            .await?;
    }

    if !plan.attach.is_empty() {
        let insert_query = format!(
            "INSERT INTO {} ({}, {})
             SELECT $1, related_id FROM UNNEST($2::BIGINT[]) AS related_id
             ON CONFLICT DO NOTHING",
            join.table, join.owner_column, join.related_column
        );
        sqlx::query(&insert_query)
            .bind(owner_id)
            .bind(&plan.attach)
            .execute(&mut *conn)
            .await?;
    }

    tracing::debug!(
        table = join.table,
        owner_id,
        attached = plan.attach.len(),
        detached = plan.detach.len(),
        "Join table synced"
    );

    Ok(plan)
}
