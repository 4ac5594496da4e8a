//! Well-known role and permission names.
//!
//! These must match the seed data in `20260301000002_seed_roles_permissions.sql`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Holds every permission implicitly; cannot be edited or deleted.
pub const ROLE_SUPER_ADMIN: &str = "super-admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_SALES_AGENT: &str = "sales-agent";

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

pub const PERM_ARTICLES_VIEW: &str = "articles.view";
pub const PERM_ARTICLES_CREATE: &str = "articles.create";
pub const PERM_ARTICLES_EDIT: &str = "articles.edit";
pub const PERM_ARTICLES_DELETE: &str = "articles.delete";
pub const PERM_ARTICLES_PUBLISH: &str = "articles.publish";
pub const PERM_CATEGORIES_MANAGE: &str = "categories.manage";
pub const PERM_AUTHORS_MANAGE: &str = "authors.manage";
pub const PERM_LEADS_VIEW: &str = "leads.view";
pub const PERM_LEADS_VIEW_ALL: &str = "leads.view_all";
pub const PERM_LEADS_CREATE: &str = "leads.create";
pub const PERM_LEADS_EDIT: &str = "leads.edit";
pub const PERM_LEADS_DELETE: &str = "leads.delete";
pub const PERM_LEADS_ASSIGN: &str = "leads.assign";
pub const PERM_TASKS_VIEW: &str = "tasks.view";
pub const PERM_TASKS_MANAGE: &str = "tasks.manage";
pub const PERM_USERS_MANAGE: &str = "users.manage";
pub const PERM_ROLES_MANAGE: &str = "roles.manage";

/// The seeded permission catalogue.
pub const ALL_PERMISSIONS: &[&str] = &[
    PERM_ARTICLES_VIEW,
    PERM_ARTICLES_CREATE,
    PERM_ARTICLES_EDIT,
    PERM_ARTICLES_DELETE,
    PERM_ARTICLES_PUBLISH,
    PERM_CATEGORIES_MANAGE,
    PERM_AUTHORS_MANAGE,
    PERM_LEADS_VIEW,
    PERM_LEADS_VIEW_ALL,
    PERM_LEADS_CREATE,
    PERM_LEADS_EDIT,
    PERM_LEADS_DELETE,
    PERM_LEADS_ASSIGN,
    PERM_TASKS_VIEW,
    PERM_TASKS_MANAGE,
    PERM_USERS_MANAGE,
    PERM_ROLES_MANAGE,
];

/// Maximum length of a role or permission name.
pub const MAX_NAME_LENGTH: usize = 100;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("static regex"));

fn validate_name(kind: &str, name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{kind} name must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }
    if !NAME_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "{kind} name may only contain lowercase letters, digits, '.', '_' and '-'"
        )));
    }
    Ok(())
}

/// Validate a role name such as `sales-agent`.
pub fn validate_role_name(name: &str) -> Result<(), CoreError> {
    validate_name("Role", name)
}

/// Validate a permission name such as `leads.assign`.
pub fn validate_permission_name(name: &str) -> Result<(), CoreError> {
    validate_name("Permission", name)
}

/// Seeded permissions that the handlers check by name. Removing one would
/// silently strip that capability from every role.
pub fn is_builtin_permission(name: &str) -> bool {
    ALL_PERMISSIONS.contains(&name)
}

/// Whether the role list grants unrestricted access.
pub fn is_super_admin<S: AsRef<str>>(roles: &[S]) -> bool {
    roles.iter().any(|r| r.as_ref() == ROLE_SUPER_ADMIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_names_are_valid() {
        for perm in ALL_PERMISSIONS {
            assert!(validate_permission_name(perm).is_ok(), "{perm}");
        }
        for role in [ROLE_SUPER_ADMIN, ROLE_ADMIN, ROLE_EDITOR, ROLE_SALES_AGENT] {
            assert!(validate_role_name(role).is_ok(), "{role}");
        }
    }

    #[test]
    fn uppercase_and_spaces_rejected() {
        assert!(validate_role_name("Sales Agent").is_err());
        assert!(validate_permission_name("Leads.View").is_err());
        assert!(validate_role_name("").is_err());
        assert!(validate_role_name("-leading").is_err());
    }

    #[test]
    fn catalogue_permissions_are_builtin() {
        assert!(is_builtin_permission("roles.manage"));
        assert!(is_builtin_permission("leads.view_all"));
        assert!(!is_builtin_permission("reports.export"));
    }

    #[test]
    fn super_admin_detection() {
        assert!(is_super_admin(&["editor", "super-admin"]));
        assert!(!is_super_admin(&["admin".to_string()]));
        assert!(!is_super_admin::<&str>(&[]));
    }
}
