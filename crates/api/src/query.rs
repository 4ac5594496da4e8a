//! Query parameter types shared by list handlers.
//!
//! List parameter structs keep `limit`/`offset` as direct fields rather than
//! a flattened struct: `serde_urlencoded` cannot parse numbers through
//! `#[serde(flatten)]`.

use pressdesk_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` ready to bind.
    pub fn resolve(&self) -> (i64, i64) {
        resolve_page(self.limit, self.offset)
    }
}

/// `?q=&limit=&offset=` for searchable lists.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Clamp raw pagination values to `1..=100` (default 25) and `>= 0`.
pub fn resolve_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        clamp_offset(offset),
    )
}

/// Treat an empty or whitespace-only search term as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
