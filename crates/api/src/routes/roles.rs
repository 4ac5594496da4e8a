//! Route definitions for roles and the permission catalogue.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::roles;
use crate::state::AppState;

/// Routes mounted at `/roles`.
///
/// ```text
/// GET    /       -> list_roles
/// POST   /       -> create_role
/// GET    /{id}   -> get_role
/// PUT    /{id}   -> update_role
/// DELETE /{id}   -> delete_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(roles::list_roles).post(roles::create_role))
        .route(
            "/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
}

/// Routes mounted at `/permissions`.
///
/// ```text
/// GET    /       -> list_permissions
/// POST   /       -> create_permission
/// DELETE /{id}   -> delete_permission
/// ```
pub fn permissions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(roles::list_permissions).post(roles::create_permission),
        )
        .route("/{id}", delete(roles::delete_permission))
}
