//! Unauthenticated read-only endpoints for the public site.
//!
//! Only articles that are published with `published_at <= now()` are
//! visible here; drafts and scheduled articles answer 404.

use axum::extract::{Path, Query, State};
use axum::Json;
use pressdesk_core::error::CoreError;
use pressdesk_db::models::article::PublicArticle;
use pressdesk_db::models::category::CategoryWithCount;
use pressdesk_db::repositories::{ArticleRepo, CategoryRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::query::{non_blank, resolve_page};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /public/articles`.
#[derive(Debug, Default, Deserialize)]
pub struct PublicArticleParams {
    /// Category slug.
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/public/articles
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<PublicArticleParams>,
) -> AppResult<Json<DataResponse<Vec<PublicArticle>>>> {
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let articles = ArticleRepo::list_public(
        &state.pool,
        non_blank(params.category.as_deref()),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: articles }))
}

/// GET /api/v1/public/articles/{slug}
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<PublicArticle>>> {
    let article = ArticleRepo::find_public_by_slug(&state.pool, &slug)
        .await?
        .ok_or(CoreError::NotFoundByKey {
            entity: "Article",
            key: slug,
        })?;
    Ok(Json(DataResponse { data: article }))
}

/// GET /api/v1/public/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryWithCount>>>> {
    let categories = CategoryRepo::list_public(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}
