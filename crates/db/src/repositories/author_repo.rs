//! Repository for the `authors` table.

use pressdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::author::{Author, CreateAuthor, UpdateAuthor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, email, bio, avatar_url, user_id, created_at, updated_at";

/// Provides CRUD operations for authors.
pub struct AuthorRepo;

impl AuthorRepo {
    /// Insert an author. `slug` overrides `input.slug`, which callers resolve first.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAuthor,
        slug: &str,
    ) -> Result<Author, sqlx::Error> {
        let query = format!(
            "INSERT INTO authors (name, slug, email, bio, avatar_url, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.email)
            .bind(&input.bio)
            .bind(&input.avatar_url)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors WHERE id = $1");
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All authors by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, Author>(&query).fetch_all(pool).await
    }

    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAuthor,
    ) -> Result<Option<Author>, sqlx::Error> {
        let query = format!(
            "UPDATE authors SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                email = COALESCE($4, email),
                bio = COALESCE($5, bio),
                avatar_url = COALESCE($6, avatar_url),
                user_id = COALESCE($7, user_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.email)
            .bind(&input.bio)
            .bind(&input.avatar_url)
            .bind(input.user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an author. Fails with `fk_articles_author` while articles
    /// reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Existing slugs equal to `base` or of the form `base-*`.
    pub async fn slugs_like(pool: &PgPool, base: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT slug FROM authors WHERE slug = $1 OR slug LIKE $1 || '-%'")
            .bind(base)
            .fetch_all(pool)
            .await
    }
}
