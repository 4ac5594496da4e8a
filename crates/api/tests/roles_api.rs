//! HTTP-level tests for roles, permissions, and transactional permission sync.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, expect_data, get_auth, post_json_auth, put_json_auth, user_with_token,
};
use pressdesk_core::permissions::{ROLE_ADMIN, ROLE_EDITOR, ROLE_SUPER_ADMIN};
use pressdesk_db::repositories::{PermissionRepo, RoleRepo};
use serde_json::json;
use sqlx::PgPool;

async fn permission_id(pool: &PgPool, name: &str) -> i64 {
    PermissionRepo::find_by_name(pool, name).await.unwrap().unwrap().id
}

fn names(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_role_with_permissions(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "admin@example.com", &[ROLE_ADMIN]).await;
    let view = permission_id(&pool, "leads.view").await;
    let tasks = permission_id(&pool, "tasks.view").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/roles",
        json!({ "name": "support", "description": "Front desk", "permission_ids": [view, tasks, view] }),
        &token,
    )
    .await;
    let data = expect_data(response, StatusCode::CREATED).await;

    assert_eq!(data["name"], "support");
    assert_eq!(data["is_protected"], false);
    assert_eq!(names(&data["permissions"]), vec!["leads.view", "tasks.view"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_permission_rolls_back_role(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "admin@example.com", &[ROLE_ADMIN]).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/roles",
        json!({ "name": "support", "permission_ids": [9999] }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Unknown permission ids: 9999");
    assert!(RoleRepo::find_by_name(&pool, "support").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_role_name_conflicts(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "admin@example.com", &[ROLE_ADMIN]).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/roles",
        json!({ "name": "editor", "permission_ids": [] }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_reports_attached_and_detached(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "admin@example.com", &[ROLE_ADMIN]).await;
    let view = permission_id(&pool, "articles.view").await;
    let leads = permission_id(&pool, "leads.view").await;
    let editor = RoleRepo::find_by_name(&pool, ROLE_EDITOR).await.unwrap().unwrap();

    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/roles/{}", editor.id),
        json!({ "permission_ids": [view, leads] }),
        &token,
    )
    .await;
    let data = expect_data(response, StatusCode::OK).await;

    assert_eq!(data["sync"]["attached"], json!([leads]));
    assert_eq!(data["sync"]["detached"].as_array().unwrap().len(), 6);
    assert_eq!(names(&data["permissions"]), vec!["articles.view", "leads.view"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_role_cannot_change(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "root@example.com", &[ROLE_SUPER_ADMIN]).await;
    let role = RoleRepo::find_by_name(&pool, ROLE_SUPER_ADMIN).await.unwrap().unwrap();
    let uri = format!("/api/v1/roles/{}", role.id);

    let rename = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "name": "root" }),
        &token,
    )
    .await;
    assert_eq!(rename.status(), StatusCode::CONFLICT);

    let repermission = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "permission_ids": [] }),
        &token,
    )
    .await;
    assert_eq!(repermission.status(), StatusCode::CONFLICT);

    let describe = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "description": "Owns everything" }),
        &token,
    )
    .await;
    assert_eq!(describe.status(), StatusCode::OK);

    let delete = delete_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(delete.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn permission_catalogue_crud(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "admin@example.com", &[ROLE_ADMIN]).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/permissions",
        json!({ "name": "reports.export", "description": "Download CSV reports" }),
        &token,
    )
    .await;
    let created = expect_data(response, StatusCode::CREATED).await;
    let id = created["id"].as_i64().unwrap();

    let bad = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/permissions",
        json!({ "name": "Reports Export" }),
        &token,
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let list = get_auth(common::build_test_app(pool.clone()), "/api/v1/permissions", &token).await;
    let list = expect_data(list, StatusCode::OK).await;
    assert!(names(&list).contains(&"reports.export".to_string()));

    let deleted = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/permissions/{id}"),
        &token,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn builtin_permissions_cannot_be_deleted(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "admin@example.com", &[ROLE_ADMIN]).await;
    let roles_manage = permission_id(&pool, "roles.manage").await;

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/permissions/{roles_manage}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Permission 'roles.manage' is built in and cannot be deleted");

    // Still granted: the admin can keep managing roles.
    let list = get_auth(common::build_test_app(pool.clone()), "/api/v1/roles", &token).await;
    assert_eq!(list.status(), StatusCode::OK);

    let missing = delete_auth(common::build_test_app(pool), "/api/v1/permissions/999999", &token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_management_requires_permission(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "ed@example.com", &[ROLE_EDITOR]).await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/roles", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
