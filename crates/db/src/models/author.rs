//! Author entity model and DTOs.

use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `authors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Author {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    /// Optional link to the staff account that writes as this author.
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an author.
#[derive(Debug, Deserialize)]
pub struct CreateAuthor {
    pub name: String,
    /// Derived from `name` if `None`.
    pub slug: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub user_id: Option<DbId>,
}

/// DTO for updating an author.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAuthor {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub user_id: Option<DbId>,
}
