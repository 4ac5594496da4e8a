//! Transactional role/permission and user/role synchronization.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use pressdesk_db::models::role::{CreateRole, UpdateRole};
use pressdesk_db::models::session::NewRefreshSession;
use pressdesk_db::models::user::{CreateUser, UpdateUser};
use pressdesk_db::repositories::{PermissionRepo, RoleRepo, SessionRepo, SyncError, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn permission_id(pool: &PgPool, name: &str) -> i64 {
    PermissionRepo::find_by_name(pool, name)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("{name} not seeded"))
        .id
}

fn new_role(name: &str) -> CreateRole {
    CreateRole {
        name: name.to_string(),
        description: None,
    }
}

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
    }
}

async fn role_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_role_with_permissions(pool: PgPool) {
    let view = permission_id(&pool, "articles.view").await;
    let edit = permission_id(&pool, "articles.edit").await;

    let role = RoleRepo::create_with_permissions(&pool, &new_role("reviewer"), &[view, edit, view])
        .await
        .unwrap();

    let names: Vec<String> = RoleRepo::permissions(&pool, role.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["articles.edit", "articles.view"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_permission_rolls_back_role_insert(pool: PgPool) {
    let before = role_count(&pool).await;
    let view = permission_id(&pool, "articles.view").await;

    let err = RoleRepo::create_with_permissions(&pool, &new_role("ghost"), &[view, 99_999])
        .await
        .unwrap_err();
    assert_matches!(err, SyncError::UnknownIds { entity: "permission", ref ids } if ids == &[99_999]);

    assert_eq!(role_count(&pool).await, before);
    assert!(RoleRepo::find_by_name(&pool, "ghost").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_role_sync_reports_changes(pool: PgPool) {
    let view = permission_id(&pool, "leads.view").await;
    let create = permission_id(&pool, "leads.create").await;
    let delete = permission_id(&pool, "leads.delete").await;

    let role = RoleRepo::create_with_permissions(&pool, &new_role("closer"), &[view, create])
        .await
        .unwrap();

    let (updated, plan) = RoleRepo::update_with_permissions(
        &pool,
        role.id,
        &UpdateRole {
            description: Some("Closes deals".to_string()),
            ..Default::default()
        },
        Some(&[view, delete]),
    )
    .await
    .unwrap()
    .expect("role exists");

    assert_eq!(updated.name, "closer");
    assert_eq!(updated.description.as_deref(), Some("Closes deals"));
    assert_eq!(plan.attach, vec![delete]);
    assert_eq!(plan.detach, vec![create]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_sync_keeps_previous_grants_and_name(pool: PgPool) {
    let view = permission_id(&pool, "tasks.view").await;
    let role = RoleRepo::create_with_permissions(&pool, &new_role("helper"), &[view])
        .await
        .unwrap();

    let result = RoleRepo::update_with_permissions(
        &pool,
        role.id,
        &UpdateRole {
            name: Some("renamed".to_string()),
            ..Default::default()
        },
        Some(&[42_424]),
    )
    .await;
    assert_matches!(result, Err(SyncError::UnknownIds { .. }));

    let reloaded = RoleRepo::find_with_permissions(&pool, role.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.role.name, "helper");
    assert_eq!(reloaded.permissions.len(), 1);
    assert_eq!(reloaded.permissions[0].id, view);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_role_returns_none(pool: PgPool) {
    let result = RoleRepo::update_with_permissions(&pool, 9_999, &UpdateRole::default(), None)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_role_name_is_unique_violation(pool: PgPool) {
    let err = RoleRepo::create_with_permissions(&pool, &new_role("editor"), &[])
        .await
        .unwrap_err();
    let SyncError::Database(sqlx::Error::Database(db_err)) = err else {
        panic!("expected a database error");
    };
    assert_eq!(db_err.constraint(), Some("uq_roles_name"));
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_roles_sync_and_effective_permissions(pool: PgPool) {
    let user = UserRepo::create_with_roles(&pool, &new_user("agent@example.com"), &[4])
        .await
        .unwrap();
    assert_eq!(
        RoleRepo::names_for_user(&pool, user.id).await.unwrap(),
        ["sales-agent"]
    );

    let perms = PermissionRepo::names_for_user(&pool, user.id).await.unwrap();
    assert!(perms.contains(&"leads.view".to_string()));
    assert!(!perms.contains(&"leads.view_all".to_string()));

    let (_, plan) = UserRepo::update_with_roles(&pool, user.id, &UpdateUser::default(), Some(&[3, 4]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plan.attach, vec![3]);
    assert!(plan.detach.is_empty());

    let by_user = RoleRepo::names_for_users(&pool, &[user.id]).await.unwrap();
    assert_eq!(by_user[&user.id], ["editor", "sales-agent"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_role_rolls_back_user_insert(pool: PgPool) {
    let result = UserRepo::create_with_roles(&pool, &new_user("nobody@example.com"), &[777]).await;
    assert_matches!(result, Err(SyncError::UnknownIds { entity: "role", .. }));

    assert!(UserRepo::find_by_email(&pool, "nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_by_email_ignores_case(pool: PgPool) {
    UserRepo::create(&pool, &new_user("Mixed.Case@Example.com"))
        .await
        .unwrap();
    let found = UserRepo::find_by_email(&pool, "mixed.case@example.com")
        .await
        .unwrap();
    assert!(found.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_login_counter_and_reset(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("lock@example.com"))
        .await
        .unwrap();
    let lock_until = Utc::now() + Duration::minutes(15);
    let first = UserRepo::record_failed_login(&pool, user.id, 3, lock_until).await.unwrap();
    assert_eq!(first.failures, 1);
    assert!(first.locked_until.is_none());
    UserRepo::record_failed_login(&pool, user.id, 3, lock_until).await.unwrap();
    let third = UserRepo::record_failed_login(&pool, user.id, 3, lock_until).await.unwrap();
    assert_eq!(third.failures, 3);
    assert!(third.locked_until.is_some());

    UserRepo::record_successful_login(&pool, user.id).await.unwrap();
    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.failed_login_count, 0);
    assert!(reloaded.locked_until.is_none());
    assert!(reloaded.last_login_at.is_some());
}

fn session_for(user_id: i64, hash: &str) -> NewRefreshSession {
    NewRefreshSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        expires_at: Utc::now() + Duration::days(7),
        user_agent: None,
        ip_address: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_rotation_is_single_use(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("rotate@example.com"))
        .await
        .unwrap();
    let first = SessionRepo::create(&pool, &session_for(user.id, "hash-a"))
        .await
        .unwrap();

    let second = SessionRepo::rotate(&pool, first.id, &session_for(user.id, "hash-b"))
        .await
        .unwrap()
        .expect("first rotation succeeds");
    assert!(SessionRepo::find_active(&pool, "hash-a").await.unwrap().is_none());
    assert_eq!(
        SessionRepo::find_active(&pool, "hash-b").await.unwrap().map(|s| s.id),
        Some(second.id)
    );

    // Spent session: nothing new is written.
    let replay = SessionRepo::rotate(&pool, first.id, &session_for(user.id, "hash-c"))
        .await
        .unwrap();
    assert!(replay.is_none());
    assert!(SessionRepo::find_active(&pool, "hash-c").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_all_then_purge(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("purge@example.com"))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session_for(user.id, "p1")).await.unwrap();
    SessionRepo::create(&pool, &session_for(user.id, "p2")).await.unwrap();
    let mut expired = session_for(user.id, "p3");
    expired.expires_at = Utc::now() - Duration::hours(1);
    SessionRepo::create(&pool, &expired).await.unwrap();

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 3);
    assert_eq!(SessionRepo::purge_stale(&pool).await.unwrap(), 3);
    assert_eq!(SessionRepo::purge_stale(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failure_after_expired_lock_restarts_count(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("relock@example.com"))
        .await
        .unwrap();
    let expired = Utc::now() - Duration::minutes(1);
    for _ in 0..3 {
        UserRepo::record_failed_login(&pool, user.id, 3, expired).await.unwrap();
    }

    let next_lock = Utc::now() + Duration::minutes(15);
    let failed = UserRepo::record_failed_login(&pool, user.id, 3, next_lock).await.unwrap();
    assert_eq!(failed.failures, 1);
    assert!(failed.locked_until.is_none());

    UserRepo::record_failed_login(&pool, user.id, 3, next_lock).await.unwrap();
    let third = UserRepo::record_failed_login(&pool, user.id, 3, next_lock).await.unwrap();
    assert_eq!(third.failures, 3);
    assert!(third.locked_until.is_some_and(|until| until > Utc::now()));
}
