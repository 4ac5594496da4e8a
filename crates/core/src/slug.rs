//! URL slug generation and validation for articles, categories, and authors.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum slug length.
pub const MAX_SLUG_LENGTH: usize = 200;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("static regex"));

/// Generate a URL-safe slug from a title or name.
///
/// Lowercases, replaces every run of non-alphanumeric characters with a
/// single hyphen, and trims hyphens from both ends. The result is truncated
/// to [`MAX_SLUG_LENGTH`] on a hyphen-free boundary.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Validate a client-supplied slug.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LENGTH} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric words separated by single hyphens"
                .into(),
        ));
    }
    Ok(())
}

/// Pick `base` if it is free, otherwise the first `base-N` (N >= 2) not in `taken`.
pub fn unique_slug<S: AsRef<str>>(base: &str, taken: &[S]) -> String {
    let is_taken = |candidate: &str| taken.iter().any(|t| t.as_ref() == candidate);
    if !is_taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_from_title() {
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
        assert_eq!(generate_slug("  --Rust   2024 -- "), "rust-2024");
        assert_eq!(generate_slug("Ünïcode café"), "n-code-caf");
    }

    #[test]
    fn empty_when_no_alphanumerics() {
        assert_eq!(generate_slug("!!! ???"), "");
    }

    #[test]
    fn long_titles_are_truncated() {
        let title = "word ".repeat(100);
        let slug = generate_slug(&title);
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
        assert!(validate_slug(&slug).is_ok());
    }

    #[test]
    fn validates_shape() {
        assert!(validate_slug("hello-world-2").is_ok());
        assert!(validate_slug("Hello").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn unique_slug_appends_counter() {
        assert_eq!(unique_slug::<&str>("news", &[]), "news");
        assert_eq!(unique_slug("news", &["news"]), "news-2");
        assert_eq!(unique_slug("news", &["news", "news-2", "news-3"]), "news-4");
        assert_eq!(unique_slug("news", &["news-2"]), "news");
    }
}
