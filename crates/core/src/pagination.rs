//! Pagination defaults and clamping shared by every list endpoint.

/// Default page size when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: i64 = 25;

/// Hard upper bound on page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a requested limit into `1..=max`, falling back to `default`.
pub fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(requested: Option<i64>) -> i64 {
    requested.unwrap_or(0).max(0)
}
