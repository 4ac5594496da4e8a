//! Article publication state and field validation.
//!
//! `is_published` and `published_at` move together: an unpublished article
//! never carries a timestamp, and a published one always does. A published
//! article whose timestamp lies in the future is scheduled.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::{max_len, require_text, validate_http_url};

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_BODY_LENGTH: usize = 200_000;
pub const MAX_EXCERPT_LENGTH: usize = 500;
pub const MAX_META_TITLE_LENGTH: usize = 255;
pub const MAX_META_DESCRIPTION_LENGTH: usize = 500;

/// Where an article sits in its publishing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationState {
    Draft,
    Scheduled,
    Published,
}

impl PublicationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }

    /// Parse a `state` query parameter.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            other => Err(CoreError::Validation(format!(
                "Invalid state '{other}'. Valid values: draft, scheduled, published"
            ))),
        }
    }
}

/// Derive the publication state from the stored columns.
pub fn publication_state(
    is_published: bool,
    published_at: Option<Timestamp>,
    now: Timestamp,
) -> PublicationState {
    match (is_published, published_at) {
        (false, _) | (true, None) => PublicationState::Draft,
        (true, Some(at)) if at > now => PublicationState::Scheduled,
        (true, Some(_)) => PublicationState::Published,
    }
}

/// Compute the `published_at` value to persist.
///
/// - Unpublished: always `None`.
/// - Published with an explicit timestamp: that timestamp.
/// - Published without one: keep the existing timestamp, or stamp `now`.
pub fn resolve_publication(
    is_published: bool,
    requested_at: Option<Timestamp>,
    existing_at: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if !is_published {
        return None;
    }
    Some(requested_at.or(existing_at).unwrap_or(now))
}

/// Validate an article title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    require_text("Title", title, MAX_TITLE_LENGTH)
}

/// Validate an article body.
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    require_text("Body", body, MAX_BODY_LENGTH)
}

/// Validate the optional descriptive fields shared by create and update.
pub fn validate_optional_fields(
    excerpt: Option<&str>,
    meta_title: Option<&str>,
    meta_description: Option<&str>,
    featured_image_url: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(excerpt) = excerpt {
        max_len("Excerpt", excerpt, MAX_EXCERPT_LENGTH)?;
    }
    if let Some(meta_title) = meta_title {
        max_len("Meta title", meta_title, MAX_META_TITLE_LENGTH)?;
    }
    if let Some(meta_description) = meta_description {
        max_len(
            "Meta description",
            meta_description,
            MAX_META_DESCRIPTION_LENGTH,
        )?;
    }
    if let Some(url) = featured_image_url {
        validate_http_url("Featured image URL", url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn unpublished_clears_timestamp() {
        let earlier = now() - Duration::days(3);
        assert_eq!(resolve_publication(false, Some(now()), Some(earlier), now()), None);
    }

    #[test]
    fn first_publish_stamps_now() {
        assert_eq!(resolve_publication(true, None, None, now()), Some(now()));
    }

    #[test]
    fn republish_keeps_original_timestamp() {
        let earlier = now() - Duration::days(3);
        assert_eq!(
            resolve_publication(true, None, Some(earlier), now()),
            Some(earlier)
        );
    }

    #[test]
    fn explicit_timestamp_wins() {
        let later = now() + Duration::days(1);
        let earlier = now() - Duration::days(3);
        assert_eq!(
            resolve_publication(true, Some(later), Some(earlier), now()),
            Some(later)
        );
    }

    #[test]
    fn state_from_columns() {
        let past = now() - Duration::hours(1);
        let future = now() + Duration::hours(1);
        assert_eq!(publication_state(false, None, now()), PublicationState::Draft);
        assert_eq!(publication_state(true, Some(past), now()), PublicationState::Published);
        assert_eq!(publication_state(true, Some(now()), now()), PublicationState::Published);
        assert_eq!(publication_state(true, Some(future), now()), PublicationState::Scheduled);
    }

    #[test]
    fn state_parsing() {
        assert_eq!(PublicationState::parse("scheduled").unwrap(), PublicationState::Scheduled);
        assert!(PublicationState::parse("archived").is_err());
        assert_eq!(PublicationState::Draft.as_str(), "draft");
    }

    #[test]
    fn optional_fields() {
        assert!(validate_optional_fields(Some("short"), None, None, Some("https://x.io/a.png")).is_ok());
        assert!(validate_optional_fields(None, None, None, Some("javascript:alert(1)")).is_err());
        let long = "x".repeat(MAX_EXCERPT_LENGTH + 1);
        assert!(validate_optional_fields(Some(&long), None, None, None).is_err());
    }

    #[test]
    fn title_and_body_required() {
        assert!(validate_title("").is_err());
        assert!(validate_body(" ").is_err());
        assert!(validate_title("Spring launch").is_ok());
    }
}
