//! Category entity model and DTOs.

use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A category with the number of articles filed under it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCount {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub article_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    /// Derived from `name` if `None`.
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating a category.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}
