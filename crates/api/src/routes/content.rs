//! Route definitions for the CMS: categories, authors, and articles.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{articles, authors, categories};
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /       -> list_categories
/// POST   /       -> create_category
/// GET    /{id}   -> get_category
/// PUT    /{id}   -> update_category
/// DELETE /{id}   -> delete_category
/// ```
pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
}

/// Routes mounted at `/authors`, same shape as categories.
pub fn authors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(authors::list_authors).post(authors::create_author))
        .route(
            "/{id}",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
}

/// Routes mounted at `/articles`.
///
/// ```text
/// GET    /                -> list_articles
/// POST   /                -> create_article
/// GET    /{id}            -> get_article
/// PUT    /{id}            -> update_article
/// DELETE /{id}            -> delete_article
/// POST   /{id}/publish    -> publish_article
/// POST   /{id}/unpublish  -> unpublish_article
/// ```
pub fn articles_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route("/{id}/publish", post(articles::publish_article))
        .route("/{id}/unpublish", post(articles::unpublish_article))
}
