//! Refresh sessions. Only the SHA-256 of a refresh token is stored.

use pressdesk_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    /// Client `User-Agent`, truncated.
    pub user_agent: Option<String>,
    /// First address in `X-Forwarded-For`, when present.
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Values for a session about to be issued.
#[derive(Debug, Clone)]
pub struct NewRefreshSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
