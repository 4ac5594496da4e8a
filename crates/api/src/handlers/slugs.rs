//! Slug resolution shared by categories, authors, and articles.

use pressdesk_core::error::CoreError;
use pressdesk_core::slug::{generate_slug, unique_slug, validate_slug};
use pressdesk_db::repositories::{ArticleRepo, AuthorRepo, CategoryRepo};
use pressdesk_db::DbPool;

use crate::error::AppResult;

/// Table whose `slug` column must stay unique.
#[derive(Debug, Clone, Copy)]
pub enum SlugScope {
    Category,
    Author,
    Article,
}

/// Pick the slug for a new row.
///
/// An explicit slug is validated and used as-is, so a collision surfaces as
/// a 409 from the unique constraint. Otherwise one is derived from `source`
/// and suffixed (`-2`, `-3`, ...) until free.
pub async fn resolve_new_slug(
    pool: &DbPool,
    scope: SlugScope,
    explicit: Option<&str>,
    source: &str,
) -> AppResult<String> {
    if let Some(slug) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        validate_slug(slug)?;
        return Ok(slug.to_string());
    }

    let base = generate_slug(source);
    if base.is_empty() {
        return Err(CoreError::Validation(format!(
            "Cannot derive a slug from '{source}'; provide one explicitly"
        ))
        .into());
    }

    let taken = match scope {
        SlugScope::Category => CategoryRepo::slugs_like(pool, &base).await?,
        SlugScope::Author => AuthorRepo::slugs_like(pool, &base).await?,
        SlugScope::Article => ArticleRepo::slugs_like(pool, &base).await?,
    };
    Ok(unique_slug(&base, &taken))
}

/// Validate an explicit slug in an update. Blank means "leave unchanged".
pub fn explicit_slug(slug: Option<&str>) -> Result<Option<String>, CoreError> {
    match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            validate_slug(slug)?;
            Ok(Some(slug.to_string()))
        }
        None => Ok(None),
    }
}
