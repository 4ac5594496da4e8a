//! Task statuses and completion rules.

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::{max_len, one_of, require_text};

pub use crate::leads::{validate_priority, VALID_PRIORITIES};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Completed and cancelled tasks are no longer open.
pub fn is_open_status(status: &str) -> bool {
    status != STATUS_COMPLETED && status != STATUS_CANCELLED
}

/// Compute `completed_at` after a status change.
pub fn resolve_completed_at(
    new_status: &str,
    existing: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if new_status == STATUS_COMPLETED {
        Some(existing.unwrap_or(now))
    } else {
        None
    }
}

/// An open task whose due time has passed.
pub fn is_overdue(status: &str, due_at: Option<Timestamp>, now: Timestamp) -> bool {
    is_open_status(status) && due_at.is_some_and(|due| due < now)
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    one_of("status", status, VALID_STATUSES)
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    require_text("Title", title, MAX_TITLE_LENGTH)
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    max_len("Description", description, MAX_DESCRIPTION_LENGTH)
}
