//! Unauthenticated routes for the public site.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public`.
///
/// ```text
/// GET /articles          -> list_articles (?category=<slug>)
/// GET /articles/{slug}   -> get_article
/// GET /categories        -> list_categories
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(public::list_articles))
        .route("/articles/{slug}", get(public::get_article))
        .route("/categories", get(public::list_categories))
}
