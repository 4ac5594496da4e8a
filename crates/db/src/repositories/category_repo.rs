//! Repository for the `categories` table.

use pressdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CategoryWithCount, CreateCategory, UpdateCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a category. `slug` overrides `input.slug`, which callers resolve first.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCategory,
        slug: &str,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, slug, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All categories by name, each with its total article count.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.id, c.name, c.slug, c.description,
                    COUNT(a.id) AS article_count,
                    c.created_at, c.updated_at
             FROM categories c
             LEFT JOIN articles a ON a.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Categories with the number of publicly visible articles in each.
    ///
    /// Categories without any visible article are omitted.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.id, c.name, c.slug, c.description,
                    COUNT(a.id) AS article_count,
                    c.created_at, c.updated_at
             FROM categories c
             JOIN articles a ON a.category_id = c.id
                AND a.is_published AND a.published_at <= NOW()
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a category. `slug` is applied only when `Some`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Fails with `fk_articles_category` while articles
    /// reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Existing slugs equal to `base` or of the form `base-*`.
    pub async fn slugs_like(pool: &PgPool, base: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT slug FROM categories WHERE slug = $1 OR slug LIKE $1 || '-%'")
            .bind(base)
            .fetch_all(pool)
            .await
    }
}
