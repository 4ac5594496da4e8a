//! Permission-based access control extractors.
//!
//! Grants are read from `user_roles` / `role_permissions` per request, so a
//! role edit takes effect without waiting for tokens to expire. Members of
//! `super-admin` pass every check.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pressdesk_core::error::CoreError;
use pressdesk_core::permissions::{self, is_super_admin, ALL_PERMISSIONS};
use pressdesk_core::types::DbId;
use pressdesk_db::repositories::{PermissionRepo, RoleRepo, UserRepo};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller together with their current roles and permissions.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub user: AuthUser,
    /// Role names as currently stored, not as recorded in the token.
    pub roles: Vec<String>,
    permissions: HashSet<String>,
    super_admin: bool,
}

impl Authorized {
    /// Build from already-loaded grants.
    pub fn new(user: AuthUser, roles: Vec<String>, permissions: Vec<String>) -> Self {
        let super_admin = is_super_admin(&roles);
        Self {
            user,
            roles,
            permissions: permissions.into_iter().collect(),
            super_admin,
        }
    }

    pub fn user_id(&self) -> DbId {
        self.user.user_id
    }

    pub fn is_super_admin(&self) -> bool {
        self.super_admin
    }

    /// Whether the caller holds `permission`.
    pub fn can(&self, permission: &str) -> bool {
        self.super_admin || self.permissions.contains(permission)
    }

    /// Reject with 403 unless the caller holds `permission`.
    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "Missing permission '{permission}'"
            ))))
        }
    }

    /// Effective permission names, sorted. A super-admin holds the full catalogue.
    pub fn permission_names(&self) -> Vec<String> {
        let mut names: Vec<String> = if self.super_admin {
            ALL_PERMISSIONS
                .iter()
                .map(|p| p.to_string())
                .chain(self.permissions.iter().cloned())
                .collect::<HashSet<_>>()
                .into_iter()
                .collect()
        } else {
            self.permissions.iter().cloned().collect()
        };
        names.sort();
        names
    }
}

impl FromRequestParts<AppState> for Authorized {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !UserRepo::is_active(&state.pool, user.user_id).await? {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is deactivated".into(),
            )));
        }

        let roles = RoleRepo::names_for_user(&state.pool, user.user_id).await?;
        let permissions = PermissionRepo::names_for_user(&state.pool, user.user_id).await?;
        Ok(Authorized::new(user, roles, permissions))
    }
}

/// A permission name usable as a type parameter of [`RequirePermission`].
pub trait Permission: Send + Sync + 'static {
    const NAME: &'static str;
}

macro_rules! permission_markers {
    ($($marker:ident => $name:path),* $(,)?) => {
        $(
            #[doc = concat!("Marker for `", stringify!($name), "`.")]
            pub struct $marker;

            impl Permission for $marker {
                const NAME: &'static str = $name;
            }
        )*
    };
}

permission_markers! {
    ArticlesView => permissions::PERM_ARTICLES_VIEW,
    ArticlesCreate => permissions::PERM_ARTICLES_CREATE,
    ArticlesEdit => permissions::PERM_ARTICLES_EDIT,
    ArticlesDelete => permissions::PERM_ARTICLES_DELETE,
    ArticlesPublish => permissions::PERM_ARTICLES_PUBLISH,
    CategoriesManage => permissions::PERM_CATEGORIES_MANAGE,
    AuthorsManage => permissions::PERM_AUTHORS_MANAGE,
    LeadsView => permissions::PERM_LEADS_VIEW,
    LeadsCreate => permissions::PERM_LEADS_CREATE,
    LeadsEdit => permissions::PERM_LEADS_EDIT,
    LeadsDelete => permissions::PERM_LEADS_DELETE,
    LeadsAssign => permissions::PERM_LEADS_ASSIGN,
    TasksView => permissions::PERM_TASKS_VIEW,
    TasksManage => permissions::PERM_TASKS_MANAGE,
    UsersManage => permissions::PERM_USERS_MANAGE,
    RolesManage => permissions::PERM_ROLES_MANAGE,
}

/// Requires the permission named by `P`. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn list_users(auth: RequirePermission<UsersManage>) -> AppResult<Json<()>> {
///     tracing::debug!(user_id = auth.user_id(), "listing users");
///     Ok(Json(()))
/// }
/// ```
pub struct RequirePermission<P: Permission>(pub Authorized, PhantomData<P>);

impl<P: Permission> Deref for RequirePermission<P> {
    type Target = Authorized;

    fn deref(&self) -> &Authorized {
        &self.0
    }
}

impl<P: Permission> FromRequestParts<AppState> for RequirePermission<P> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Authorized::from_request_parts(parts, state).await?;
        auth.require(P::NAME)?;
        Ok(RequirePermission(auth, PhantomData))
    }
}
