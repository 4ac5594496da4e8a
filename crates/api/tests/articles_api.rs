//! HTTP-level tests for categories, authors, articles, publication, and the
//! public site.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    delete_auth, expect_data, get, get_auth, post_auth, post_json_auth, put_json_auth,
    user_with_token,
};
use pressdesk_core::permissions::{ROLE_EDITOR, ROLE_SALES_AGENT};
use pressdesk_db::models::role::CreateRole;
use pressdesk_db::repositories::{PermissionRepo, RoleRepo};
use serde_json::{json, Value};
use sqlx::PgPool;

/// A category and an author created through the API, plus an editor token.
struct Newsroom {
    pool: PgPool,
    token: String,
    category_id: i64,
    author_id: i64,
}

impl Newsroom {
    async fn new(pool: PgPool) -> Self {
        let (_, token) = user_with_token(&pool, "ed@example.com", &[ROLE_EDITOR]).await;

        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/categories",
            json!({ "name": "World News" }),
            &token,
        )
        .await;
        let category = expect_data(response, StatusCode::CREATED).await;
        assert_eq!(category["slug"], "world-news");

        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/authors",
            json!({ "name": "Ada Writer", "bio": "Covers science." }),
            &token,
        )
        .await;
        let author = expect_data(response, StatusCode::CREATED).await;

        Self {
            pool,
            token,
            category_id: category["id"].as_i64().unwrap(),
            author_id: author["id"].as_i64().unwrap(),
        }
    }

    fn app(&self) -> axum::Router {
        common::build_test_app(self.pool.clone())
    }

    async fn create_article(&self, extra: Value) -> Value {
        let mut body = json!({
            "title": "Hello World",
            "body": "First post.",
            "category_id": self.category_id,
            "author_id": self.author_id,
        });
        for (key, value) in extra.as_object().unwrap() {
            body[key] = value.clone();
        }
        let response = post_json_auth(self.app(), "/api/v1/articles", body, &self.token).await;
        expect_data(response, StatusCode::CREATED).await
    }
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn article_states_follow_publication(pool: PgPool) {
    let room = Newsroom::new(pool).await;

    let draft = room.create_article(json!({})).await;
    assert_eq!(draft["state"], "draft");
    assert_eq!(draft["published_at"], Value::Null);

    let future = Utc::now() + Duration::days(3);
    let scheduled = room
        .create_article(json!({ "title": "Coming Soon", "is_published": true, "published_at": future }))
        .await;
    assert_eq!(scheduled["state"], "scheduled");

    let live = room
        .create_article(json!({ "title": "Breaking", "is_published": true }))
        .await;
    assert_eq!(live["state"], "published");
    assert!(live["published_at"].is_string());

    let response = get_auth(room.app(), "/api/v1/articles?state=scheduled", &room.token).await;
    let list = expect_data(response, StatusCode::OK).await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Coming Soon"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_and_unpublish(pool: PgPool) {
    let room = Newsroom::new(pool).await;
    let draft = room.create_article(json!({})).await;
    let id = draft["id"].as_i64().unwrap();

    let response = post_auth(room.app(), &format!("/api/v1/articles/{id}/publish"), &room.token).await;
    let published = expect_data(response, StatusCode::OK).await;
    assert_eq!(published["is_published"], true);
    assert_eq!(published["state"], "published");

    let response = post_auth(room.app(), &format!("/api/v1/articles/{id}/unpublish"), &room.token).await;
    let unpublished = expect_data(response, StatusCode::OK).await;
    assert_eq!(unpublished["is_published"], false);
    assert_eq!(unpublished["published_at"], Value::Null);
    assert_eq!(unpublished["state"], "draft");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_accepts_a_schedule(pool: PgPool) {
    let room = Newsroom::new(pool).await;
    let draft = room.create_article(json!({})).await;
    let id = draft["id"].as_i64().unwrap();

    let response = post_json_auth(
        room.app(),
        &format!("/api/v1/articles/{id}/publish"),
        json!({ "published_at": Utc::now() + Duration::hours(6) }),
        &room.token,
    )
    .await;
    let scheduled = expect_data(response, StatusCode::OK).await;

    assert_eq!(scheduled["state"], "scheduled");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn derived_slugs_get_suffixes_and_explicit_ones_conflict(pool: PgPool) {
    let room = Newsroom::new(pool).await;

    let first = room.create_article(json!({})).await;
    let second = room.create_article(json!({})).await;
    assert_eq!(first["slug"], "hello-world");
    assert_eq!(second["slug"], "hello-world-2");

    let response = post_json_auth(
        room.app(),
        "/api/v1/articles",
        json!({
            "title": "Another",
            "slug": "hello-world",
            "body": "Dup.",
            "category_id": room.category_id,
            "author_id": room.author_id,
        }),
        &room.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_references_are_bad_requests(pool: PgPool) {
    let room = Newsroom::new(pool).await;

    let response = post_json_auth(
        room.app(),
        "/api/v1/articles",
        json!({
            "title": "Orphan",
            "body": "No home.",
            "category_id": 9999,
            "author_id": room.author_id,
        }),
        &room.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publishing_needs_publish_permission(pool: PgPool) {
    let room = Newsroom::new(pool.clone()).await;
    let mut permission_ids = Vec::new();
    for name in ["articles.view", "articles.create", "articles.edit"] {
        permission_ids.push(PermissionRepo::find_by_name(&pool, name).await.unwrap().unwrap().id);
    }
    let role = CreateRole {
        name: "writer".to_string(),
        description: None,
    };
    RoleRepo::create_with_permissions(&pool, &role, &permission_ids)
        .await
        .unwrap();
    let (_, writer) = user_with_token(&pool, "writer@example.com", &["writer"]).await;

    let draft = post_json_auth(
        room.app(),
        "/api/v1/articles",
        json!({
            "title": "Writer Draft",
            "body": "Words.",
            "category_id": room.category_id,
            "author_id": room.author_id,
        }),
        &writer,
    )
    .await;
    let draft = expect_data(draft, StatusCode::CREATED).await;
    let id = draft["id"].as_i64().unwrap();

    let edit = put_json_auth(
        room.app(),
        &format!("/api/v1/articles/{id}"),
        json!({ "title": "Writer Draft, revised" }),
        &writer,
    )
    .await;
    assert_eq!(edit.status(), StatusCode::OK);

    let sneak = put_json_auth(
        room.app(),
        &format!("/api/v1/articles/{id}"),
        json!({ "is_published": true }),
        &writer,
    )
    .await;
    assert_eq!(sneak.status(), StatusCode::FORBIDDEN);

    let publish = post_auth(room.app(), &format!("/api/v1/articles/{id}/publish"), &writer).await;
    assert_eq!(publish.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sales_agents_cannot_touch_content(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "sam@example.com", &[ROLE_SALES_AGENT]).await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/articles", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Categories and authors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn referenced_category_and_author_cannot_be_deleted(pool: PgPool) {
    let room = Newsroom::new(pool).await;
    room.create_article(json!({})).await;

    let category = delete_auth(
        room.app(),
        &format!("/api/v1/categories/{}", room.category_id),
        &room.token,
    )
    .await;
    assert_eq!(category.status(), StatusCode::CONFLICT);

    let author = delete_auth(
        room.app(),
        &format!("/api/v1/authors/{}", room.author_id),
        &room.token,
    )
    .await;
    assert_eq!(author.status(), StatusCode::CONFLICT);

    let response = get_auth(room.app(), "/api/v1/categories", &room.token).await;
    let categories = expect_data(response, StatusCode::OK).await;
    assert_eq!(categories[0]["article_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn author_link_must_reference_a_user(pool: PgPool) {
    let room = Newsroom::new(pool).await;

    let response = post_json_auth(
        room.app(),
        "/api/v1/authors",
        json!({ "name": "Linked", "user_id": 9999 }),
        &room.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Public site
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn public_site_shows_only_live_articles(pool: PgPool) {
    let room = Newsroom::new(pool).await;
    room.create_article(json!({ "title": "Quiet Draft" })).await;
    room.create_article(json!({
        "title": "Embargoed",
        "is_published": true,
        "published_at": Utc::now() + Duration::days(1),
    }))
    .await;
    room.create_article(json!({ "title": "Front Page", "is_published": true }))
        .await;

    let response = get(room.app(), "/api/v1/public/articles").await;
    let articles = expect_data(response, StatusCode::OK).await;
    let articles = articles.as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["slug"], "front-page");
    assert_eq!(articles[0]["category_slug"], "world-news");
    assert_eq!(articles[0]["author_name"], "Ada Writer");

    let by_category = get(room.app(), "/api/v1/public/articles?category=world-news").await;
    assert_eq!(expect_data(by_category, StatusCode::OK).await.as_array().unwrap().len(), 1);

    let other = get(room.app(), "/api/v1/public/articles?category=sports").await;
    assert!(expect_data(other, StatusCode::OK).await.as_array().unwrap().is_empty());

    let embargoed = get(room.app(), "/api/v1/public/articles/embargoed").await;
    assert_eq!(embargoed.status(), StatusCode::NOT_FOUND);

    let live = get(room.app(), "/api/v1/public/articles/front-page").await;
    let live = expect_data(live, StatusCode::OK).await;
    assert_eq!(live["title"], "Front Page");

    let categories = get(room.app(), "/api/v1/public/categories").await;
    let categories = expect_data(categories, StatusCode::OK).await;
    assert_eq!(categories[0]["article_count"], 1);
}
