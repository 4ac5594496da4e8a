pub mod auth;
pub mod content;
pub mod health;
pub mod leads;
pub mod public;
pub mod roles;
pub mod tasks;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login, /auth/refresh, /auth/logout, /auth/me
///
/// /users                              list, create (users.manage)
/// /users/{id}                         get, update, deactivate
/// /users/{id}/reset-password          reset password
///
/// /roles                              list, create (roles.manage)
/// /roles/{id}                         get, update, delete
/// /permissions                        list, create (roles.manage)
/// /permissions/{id}                   delete
///
/// /categories, /authors               CRUD
/// /articles                           CRUD
/// /articles/{id}/publish|unpublish    publication (articles.publish)
///
/// /public/articles                    visible articles (no auth)
/// /public/articles/{slug}             one visible article
/// /public/categories                  categories with visible counts
///
/// /leads                              CRUD, scoped by leads.view_all
/// /leads/follow-ups/due               due follow-ups
/// /leads/{id}/assign                  assign or unassign
/// /leads/{id}/follow-up               set or clear next follow-up
/// /leads/{id}/notes                   list, record
/// /leads/{id}/notes/{note_id}         delete
///
/// /tasks                              CRUD
/// /tasks/{id}/complete                mark completed
///
/// /dashboard                          landing page summary
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/permissions", roles::permissions_router())
        .nest("/categories", content::categories_router())
        .nest("/authors", content::authors_router())
        .nest("/articles", content::articles_router())
        .nest("/public", public::router())
        .nest("/leads", leads::router())
        .nest("/tasks", tasks::router())
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
}
