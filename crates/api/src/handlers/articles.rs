//! Handlers for the admin `/articles` resource.
//!
//! `published_at` is always derived through `resolve_publication`, so the
//! stored pair never violates "published iff timestamped".

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pressdesk_core::articles::{
    resolve_publication, validate_body, validate_optional_fields, validate_title,
    PublicationState,
};
use pressdesk_core::error::CoreError;
use pressdesk_core::permissions::PERM_ARTICLES_PUBLISH;
use pressdesk_core::types::{DbId, Timestamp};
use pressdesk_db::models::article::{
    Article, ArticleFilter, ArticleResponse, CreateArticle, Publication, UpdateArticle,
};
use pressdesk_db::repositories::{ArticleRepo, AuthorRepo, CategoryRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::slugs::{explicit_slug, resolve_new_slug, SlugScope};
use crate::middleware::rbac::{
    ArticlesCreate, ArticlesDelete, ArticlesEdit, ArticlesPublish, ArticlesView,
    RequirePermission,
};
use crate::query::{non_blank, resolve_page};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /articles`.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleListParams {
    pub category_id: Option<DbId>,
    pub author_id: Option<DbId>,
    /// `draft`, `scheduled`, or `published`.
    pub state: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Optional body for `POST /articles/{id}/publish`.
#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    /// A future time schedules the article.
    pub published_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/articles
pub async fn list_articles(
    State(state): State<AppState>,
    _auth: RequirePermission<ArticlesView>,
    Query(params): Query<ArticleListParams>,
) -> AppResult<Json<DataResponse<Vec<ArticleResponse>>>> {
    let publication_state = params
        .state
        .as_deref()
        .map(PublicationState::parse)
        .transpose()?;
    let (limit, offset) = resolve_page(params.limit, params.offset);

    let filter = ArticleFilter {
        category_id: params.category_id,
        author_id: params.author_id,
        state: publication_state,
        q: non_blank(params.q.as_deref()).map(str::to_string),
        limit,
        offset,
    };
    let articles = ArticleRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse {
        data: articles.into_iter().map(ArticleResponse::from).collect(),
    }))
}

/// POST /api/v1/articles
///
/// Creating an article as published additionally needs `articles.publish`.
pub async fn create_article(
    State(state): State<AppState>,
    auth: RequirePermission<ArticlesCreate>,
    Json(input): Json<CreateArticle>,
) -> AppResult<(StatusCode, Json<DataResponse<ArticleResponse>>)> {
    validate_title(&input.title)?;
    validate_body(&input.body)?;
    validate_optional_fields(
        input.excerpt.as_deref(),
        input.meta_title.as_deref(),
        input.meta_description.as_deref(),
        input.featured_image_url.as_deref(),
    )?;
    if input.is_published {
        auth.require(PERM_ARTICLES_PUBLISH)?;
    }
    ensure_references(&state, Some(input.category_id), Some(input.author_id)).await?;

    let slug = resolve_new_slug(&state.pool, SlugScope::Article, input.slug.as_deref(), &input.title)
        .await?;
    let publication = Publication {
        is_published: input.is_published,
        published_at: resolve_publication(input.is_published, input.published_at, None, Utc::now()),
    };

    let article = ArticleRepo::create(&state.pool, &input, &slug, publication, auth.user_id()).await?;
    tracing::info!(
        article_id = article.id,
        slug = %article.slug,
        state = article.state().as_str(),
        user_id = auth.user_id(),
        "Article created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: article.into() })))
}

/// GET /api/v1/articles/{id}
pub async fn get_article(
    State(state): State<AppState>,
    _auth: RequirePermission<ArticlesView>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ArticleResponse>>> {
    let article = find_article(&state, id).await?;
    Ok(Json(DataResponse { data: article.into() }))
}

/// PUT /api/v1/articles/{id}
///
/// Touching `is_published` or `published_at` additionally needs `articles.publish`.
pub async fn update_article(
    State(state): State<AppState>,
    auth: RequirePermission<ArticlesEdit>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateArticle>,
) -> AppResult<Json<DataResponse<ArticleResponse>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(body) = &input.body {
        validate_body(body)?;
    }
    validate_optional_fields(
        input.excerpt.as_deref(),
        input.meta_title.as_deref(),
        input.meta_description.as_deref(),
        input.featured_image_url.as_deref(),
    )?;
    if input.touches_publication() {
        auth.require(PERM_ARTICLES_PUBLISH)?;
    }

    let existing = find_article(&state, id).await?;
    ensure_references(&state, input.category_id, input.author_id).await?;

    let publication = input.touches_publication().then(|| {
        let is_published = input.is_published.unwrap_or(existing.is_published);
        Publication {
            is_published,
            published_at: resolve_publication(
                is_published,
                input.published_at,
                existing.published_at,
                Utc::now(),
            ),
        }
    });
    let input = UpdateArticle {
        slug: explicit_slug(input.slug.as_deref())?,
        ..input
    };

    let article = ArticleRepo::update(&state.pool, id, &input, publication)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        article_id = id,
        state = article.state().as_str(),
        user_id = auth.user_id(),
        "Article updated"
    );
    Ok(Json(DataResponse { data: article.into() }))
}

/// DELETE /api/v1/articles/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    auth: RequirePermission<ArticlesDelete>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ArticleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(article_id = id, user_id = auth.user_id(), "Article deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/articles/{id}/publish
///
/// Body is optional. Without `published_at` an already-published article
/// keeps its timestamp and a draft is stamped with the current time.
pub async fn publish_article(
    State(state): State<AppState>,
    auth: RequirePermission<ArticlesPublish>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<DataResponse<ArticleResponse>>> {
    let request: PublishRequest = if body.is_empty() {
        PublishRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let existing = find_article(&state, id).await?;
    let publication = Publication {
        is_published: true,
        published_at: resolve_publication(
            true,
            request.published_at,
            existing.published_at,
            Utc::now(),
        ),
    };
    let article = ArticleRepo::set_publication(&state.pool, id, publication)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        article_id = id,
        state = article.state().as_str(),
        user_id = auth.user_id(),
        "Article published"
    );
    Ok(Json(DataResponse { data: article.into() }))
}

/// POST /api/v1/articles/{id}/unpublish
///
/// Returns the article to draft and clears its timestamp.
pub async fn unpublish_article(
    State(state): State<AppState>,
    auth: RequirePermission<ArticlesPublish>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ArticleResponse>>> {
    let publication = Publication {
        is_published: false,
        published_at: None,
    };
    let article = ArticleRepo::set_publication(&state.pool, id, publication)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(article_id = id, user_id = auth.user_id(), "Article unpublished");
    Ok(Json(DataResponse { data: article.into() }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Article",
        id,
    })
}

async fn find_article(state: &AppState, id: DbId) -> AppResult<Article> {
    ArticleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Referenced category and author must exist (400 otherwise).
async fn ensure_references(
    state: &AppState,
    category_id: Option<DbId>,
    author_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = category_id {
        if CategoryRepo::find_by_id(&state.pool, id).await?.is_none() {
            return Err(AppError::BadRequest(format!("Category with id {id} does not exist")));
        }
    }
    if let Some(id) = author_id {
        if AuthorRepo::find_by_id(&state.pool, id).await?.is_none() {
            return Err(AppError::BadRequest(format!("Author with id {id} does not exist")));
        }
    }
    Ok(())
}
