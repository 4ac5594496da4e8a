//! Repository for the `articles` table, admin and public views.

use pressdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{
    Article, ArticleFilter, CreateArticle, PublicArticle, Publication, UpdateArticle,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, slug, excerpt, body, featured_image_url, meta_title, \
                        meta_description, category_id, author_id, is_published, published_at, \
                        created_by, created_at, updated_at";

/// Joined projection for the public site.
const PUBLIC_COLUMNS: &str = "a.id, a.title, a.slug, a.excerpt, a.body, a.featured_image_url, \
                               a.meta_title, a.meta_description, a.published_at, \
                               c.name AS category_name, c.slug AS category_slug, \
                               au.name AS author_name, au.slug AS author_slug, \
                               au.bio AS author_bio, au.avatar_url AS author_avatar_url";

/// Only rows matching this predicate are visible without authentication.
const PUBLICLY_VISIBLE: &str = "a.is_published AND a.published_at <= NOW()";

/// Provides CRUD operations for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    /// Insert an article with a resolved slug and publication.
    pub async fn create(
        pool: &PgPool,
        input: &CreateArticle,
        slug: &str,
        publication: Publication,
        created_by: DbId,
    ) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles
                (title, slug, excerpt, body, featured_image_url, meta_title, meta_description,
                 category_id, author_id, is_published, published_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(&input.title)
            .bind(slug)
            .bind(&input.excerpt)
            .bind(&input.body)
            .bind(&input.featured_image_url)
            .bind(&input.meta_title)
            .bind(&input.meta_description)
            .bind(input.category_id)
            .bind(input.author_id)
            .bind(publication.is_published)
            .bind(publication.published_at)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Admin list, most recently updated first.
    pub async fn list(pool: &PgPool, filter: &ArticleFilter) -> Result<Vec<Article>, sqlx::Error> {
        let pattern = filter.q.as_deref().map(|q| format!("%{q}%"));
        let query = format!(
            "SELECT {COLUMNS} FROM articles
             WHERE ($1::BIGINT IS NULL OR category_id = $1)
               AND ($2::BIGINT IS NULL OR author_id = $2)
               AND ($3::TEXT IS NULL
                    OR ($3 = 'draft' AND NOT is_published)
                    OR ($3 = 'scheduled' AND is_published AND published_at > NOW())
                    OR ($3 = 'published' AND is_published AND published_at <= NOW()))
               AND ($4::TEXT IS NULL OR title ILIKE $4 OR slug ILIKE $4)
             ORDER BY updated_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(filter.category_id)
            .bind(filter.author_id)
            .bind(filter.state.map(|s| s.as_str()))
            .bind(pattern)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Update content fields and, when `publication` is `Some`, the
    /// publication columns.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateArticle,
        publication: Option<Publication>,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                excerpt = COALESCE($4, excerpt),
                body = COALESCE($5, body),
                featured_image_url = COALESCE($6, featured_image_url),
                meta_title = COALESCE($7, meta_title),
                meta_description = COALESCE($8, meta_description),
                category_id = COALESCE($9, category_id),
                author_id = COALESCE($10, author_id),
                is_published = CASE WHEN $11 THEN $12 ELSE is_published END,
                published_at = CASE WHEN $11 THEN $13 ELSE published_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.excerpt)
            .bind(&input.body)
            .bind(&input.featured_image_url)
            .bind(&input.meta_title)
            .bind(&input.meta_description)
            .bind(input.category_id)
            .bind(input.author_id)
            .bind(publication.is_some())
            .bind(publication.map(|p| p.is_published))
            .bind(publication.and_then(|p| p.published_at))
            .fetch_optional(pool)
            .await
    }

    /// Set only the publication columns.
    pub async fn set_publication(
        pool: &PgPool,
        id: DbId,
        publication: Publication,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET is_published = $2, published_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(publication.is_published)
            .bind(publication.published_at)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Existing slugs equal to `base` or of the form `base-*`.
    pub async fn slugs_like(pool: &PgPool, base: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT slug FROM articles WHERE slug = $1 OR slug LIKE $1 || '-%'")
            .bind(base)
            .fetch_all(pool)
            .await
    }

    /// Publicly visible articles, newest first, optionally within one category.
    pub async fn list_public(
        pool: &PgPool,
        category_slug: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PublicArticle>, sqlx::Error> {
        let query = format!(
            "SELECT {PUBLIC_COLUMNS}
             FROM articles a
             JOIN categories c ON c.id = a.category_id
             JOIN authors au ON au.id = a.author_id
             WHERE {PUBLICLY_VISIBLE}
               AND ($1::TEXT IS NULL OR c.slug = $1)
             ORDER BY a.published_at DESC, a.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PublicArticle>(&query)
            .bind(category_slug)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// A publicly visible article by slug.
    pub async fn find_public_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<PublicArticle>, sqlx::Error> {
        let query = format!(
            "SELECT {PUBLIC_COLUMNS}
             FROM articles a
             JOIN categories c ON c.id = a.category_id
             JOIN authors au ON au.id = a.author_id
             WHERE {PUBLICLY_VISIBLE} AND a.slug = $1"
        );
        sqlx::query_as::<_, PublicArticle>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
