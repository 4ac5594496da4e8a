//! Article entity model, DTOs, and list filters.

use chrono::Utc;
use pressdesk_core::articles::{publication_state, PublicationState};
use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `articles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub category_id: DbId,
    pub author_id: DbId,
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Article {
    pub fn state(&self) -> PublicationState {
        publication_state(self.is_published, self.published_at, Utc::now())
    }
}

/// Admin-facing article payload with its computed publication state.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    #[serde(flatten)]
    pub article: Article,
    pub state: PublicationState,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        let state = article.state();
        Self { article, state }
    }
}

/// A publicly visible article joined with its category and author.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicArticle {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_at: Timestamp,
    pub category_name: String,
    pub category_slug: String,
    pub author_name: String,
    pub author_slug: String,
    pub author_bio: Option<String>,
    pub author_avatar_url: Option<String>,
}

/// DTO for creating an article.
#[derive(Debug, Deserialize)]
pub struct CreateArticle {
    pub title: String,
    /// Derived from `title` if `None`.
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: String,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub category_id: DbId,
    pub author_id: DbId,
    #[serde(default)]
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
}

/// DTO for updating an article. Publication fields are applied separately
/// through [`Publication`] once resolved.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub category_id: Option<DbId>,
    pub author_id: Option<DbId>,
    pub is_published: Option<bool>,
    pub published_at: Option<Timestamp>,
}

impl UpdateArticle {
    /// Whether the patch touches publication state.
    pub fn touches_publication(&self) -> bool {
        self.is_published.is_some() || self.published_at.is_some()
    }
}

/// Resolved publication columns to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publication {
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
}

/// Filters for the admin article list.
#[derive(Debug, Default)]
pub struct ArticleFilter {
    pub category_id: Option<DbId>,
    pub author_id: Option<DbId>,
    pub state: Option<PublicationState>,
    pub q: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
