//! Lead entity model, DTOs, and list filters.

use pressdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `leads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: String,
    pub status: String,
    pub priority: String,
    /// Estimated deal value in minor currency units.
    pub estimated_value_cents: Option<i64>,
    pub assigned_to: Option<DbId>,
    pub next_follow_up_at: Option<Timestamp>,
    pub last_contacted_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lead.
#[derive(Debug, Deserialize)]
pub struct CreateLead {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_value_cents: Option<i64>,
    /// Defaults to the creating user.
    pub assigned_to: Option<DbId>,
    pub next_follow_up_at: Option<Timestamp>,
}

/// DTO for updating a lead. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLead {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_value_cents: Option<i64>,
    pub assigned_to: Option<DbId>,
}

/// Filters for the lead list.
#[derive(Debug, Default)]
pub struct LeadFilter {
    pub status: Option<String>,
    pub source: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<DbId>,
    pub q: Option<String>,
    /// Restrict to leads assigned to this user (`None` = all leads).
    pub visible_to: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}
