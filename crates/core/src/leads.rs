//! Lead pipeline vocabulary, follow-up rules, and validation.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::{max_len, one_of, require_text, validate_email};

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

pub const STATUS_NEW: &str = "new";
pub const STATUS_CONTACTED: &str = "contacted";
pub const STATUS_QUALIFIED: &str = "qualified";
pub const STATUS_PROPOSAL: &str = "proposal";
pub const STATUS_NEGOTIATION: &str = "negotiation";
pub const STATUS_WON: &str = "won";
pub const STATUS_LOST: &str = "lost";

/// Pipeline statuses in pipeline order.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_NEW,
    STATUS_CONTACTED,
    STATUS_QUALIFIED,
    STATUS_PROPOSAL,
    STATUS_NEGOTIATION,
    STATUS_WON,
    STATUS_LOST,
];

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

pub const SOURCE_WEBSITE: &str = "website";
pub const SOURCE_REFERRAL: &str = "referral";
pub const SOURCE_SOCIAL: &str = "social";
pub const SOURCE_EMAIL_CAMPAIGN: &str = "email_campaign";
pub const SOURCE_EVENT: &str = "event";
pub const SOURCE_COLD_CALL: &str = "cold_call";
pub const SOURCE_OTHER: &str = "other";

pub const VALID_SOURCES: &[&str] = &[
    SOURCE_WEBSITE,
    SOURCE_REFERRAL,
    SOURCE_SOCIAL,
    SOURCE_EMAIL_CAMPAIGN,
    SOURCE_EVENT,
    SOURCE_COLD_CALL,
    SOURCE_OTHER,
];

// ---------------------------------------------------------------------------
// Priorities (shared with tasks)
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

pub const VALID_PRIORITIES: &[&str] = &[
    PRIORITY_LOW,
    PRIORITY_MEDIUM,
    PRIORITY_HIGH,
    PRIORITY_URGENT,
];

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_COMPANY_LENGTH: usize = 200;
pub const MAX_NOTE_LENGTH: usize = 10_000;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+()\-. ]{5,32}$").expect("static regex"));

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Won and lost leads are closed.
pub fn is_closed_status(status: &str) -> bool {
    status == STATUS_WON || status == STATUS_LOST
}

/// Compute `closed_at` after a status change.
///
/// Closing keeps an existing timestamp (won -> lost does not move it);
/// reopening clears it.
pub fn resolve_closed_at(
    new_status: &str,
    existing: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if is_closed_status(new_status) {
        Some(existing.unwrap_or(now))
    } else {
        None
    }
}

/// Status a lead moves to once it has been contacted.
pub fn status_after_contact(status: &str) -> &str {
    if status == STATUS_NEW {
        STATUS_CONTACTED
    } else {
        status
    }
}

/// A follow-up must be scheduled in the future.
pub fn validate_follow_up(at: Timestamp) -> Result<(), CoreError> {
    if at <= Utc::now() {
        return Err(CoreError::Validation(
            "Follow-up time must be in the future".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    one_of("status", status, VALID_STATUSES)
}

pub fn validate_source(source: &str) -> Result<(), CoreError> {
    one_of("source", source, VALID_SOURCES)
}

pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    one_of("priority", priority, VALID_PRIORITIES)
}

pub fn validate_first_name(name: &str) -> Result<(), CoreError> {
    require_text("First name", name, MAX_NAME_LENGTH)
}

pub fn validate_last_name(name: &str) -> Result<(), CoreError> {
    max_len("Last name", name, MAX_NAME_LENGTH)
}

pub fn validate_company(company: &str) -> Result<(), CoreError> {
    max_len("Company", company, MAX_COMPANY_LENGTH)
}

pub fn validate_phone(phone: &str) -> Result<(), CoreError> {
    if !PHONE_RE.is_match(phone) {
        return Err(CoreError::Validation(
            "Phone must be 5-32 characters of digits, spaces, and + ( ) - .".into(),
        ));
    }
    Ok(())
}

/// A lead needs at least one way to reach it; whichever are given must be valid.
pub fn validate_contact(email: Option<&str>, phone: Option<&str>) -> Result<(), CoreError> {
    let email = email.filter(|e| !e.trim().is_empty());
    let phone = phone.filter(|p| !p.trim().is_empty());
    if email.is_none() && phone.is_none() {
        return Err(CoreError::Validation(
            "A lead needs an email address or a phone number".into(),
        ));
    }
    if let Some(email) = email {
        validate_email("Email", email)?;
    }
    if let Some(phone) = phone {
        validate_phone(phone)?;
    }
    Ok(())
}

/// Trimmed contact value; blank counts as not given.
pub fn normalize_contact(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn validate_estimated_value(cents: i64) -> Result<(), CoreError> {
    if cents < 0 {
        return Err(CoreError::Validation(
            "Estimated value must not be negative".into(),
        ));
    }
    Ok(())
}

pub fn validate_note_body(body: &str) -> Result<(), CoreError> {
    require_text("Note", body, MAX_NOTE_LENGTH)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn blank_contact_is_absent() {
        assert_eq!(normalize_contact(Some("   ".into())), None);
        assert_eq!(normalize_contact(Some(String::new())), None);
        assert_eq!(normalize_contact(None), None);
        assert_eq!(
            normalize_contact(Some(" 555-0100 ".into())).as_deref(),
            Some("555-0100")
        );
    }

    #[test]
    fn closing_stamps_once() {
        let earlier = now() - Duration::days(2);
        assert_eq!(resolve_closed_at(STATUS_WON, None, now()), Some(now()));
        assert_eq!(resolve_closed_at(STATUS_LOST, Some(earlier), now()), Some(earlier));
    }

    #[test]
    fn reopening_clears_closed_at() {
        let earlier = now() - Duration::days(2);
        assert_eq!(resolve_closed_at(STATUS_NEGOTIATION, Some(earlier), now()), None);
    }

    #[test]
    fn contact_advances_only_new_leads() {
        assert_eq!(status_after_contact(STATUS_NEW), STATUS_CONTACTED);
        assert_eq!(status_after_contact(STATUS_PROPOSAL), STATUS_PROPOSAL);
        assert_eq!(status_after_contact(STATUS_LOST), STATUS_LOST);
    }

    #[test]
    fn contact_requires_email_or_phone() {
        assert_matches!(validate_contact(None, Some("  ")), Err(CoreError::Validation(_)));
        assert!(validate_contact(Some("lead@example.com"), None).is_ok());
        assert!(validate_contact(None, Some("+1 (555) 010-2000")).is_ok());
        assert!(validate_contact(Some("nope"), Some("+1 555 0100")).is_err());
        assert!(validate_contact(None, Some("call me maybe")).is_err());
    }

    #[test]
    fn vocabularies() {
        assert!(validate_status("qualified").is_ok());
        assert!(validate_status("archived").is_err());
        assert!(validate_source("cold_call").is_ok());
        assert!(validate_source("billboard").is_err());
        assert!(validate_priority("urgent").is_ok());
        assert!(validate_priority("critical").is_err());
    }

    #[test]
    fn follow_up_must_be_future() {
        assert!(validate_follow_up(Utc::now() + Duration::hours(1)).is_ok());
        assert!(validate_follow_up(Utc::now() - Duration::minutes(1)).is_err());
    }

    #[test]
    fn negative_value_rejected() {
        assert!(validate_estimated_value(-1).is_err());
        assert!(validate_estimated_value(0).is_ok());
    }
}
