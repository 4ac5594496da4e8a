//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`. All require `users.manage`.
///
/// ```text
/// GET    /                     -> list_users
/// POST   /                     -> create_user
/// GET    /{id}                 -> get_user
/// PUT    /{id}                 -> update_user
/// DELETE /{id}                 -> deactivate_user
/// POST   /{id}/reset-password  -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::deactivate_user),
        )
        .route("/{id}/reset-password", post(users::reset_password))
}
