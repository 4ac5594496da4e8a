//! Lead note model and DTO.

use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `lead_notes`, joined with the author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeadNote {
    pub id: DbId,
    pub lead_id: DbId,
    pub user_id: Option<DbId>,
    pub author_name: Option<String>,
    pub body: String,
    /// Whether this note records an actual contact with the lead.
    pub is_contact: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a note on a lead.
#[derive(Debug, Deserialize)]
pub struct CreateLeadNote {
    pub body: String,
    #[serde(default)]
    pub is_contact: bool,
    pub next_follow_up_at: Option<Timestamp>,
}
