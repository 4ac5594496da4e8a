//! Handlers for the `/authors` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pressdesk_core::error::CoreError;
use pressdesk_core::permissions::{PERM_ARTICLES_VIEW, PERM_AUTHORS_MANAGE};
use pressdesk_core::types::DbId;
use pressdesk_core::validation::{max_len, require_text, validate_email, validate_http_url};
use pressdesk_db::models::author::{Author, CreateAuthor, UpdateAuthor};
use pressdesk_db::repositories::{AuthorRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::slugs::{explicit_slug, resolve_new_slug, SlugScope};
use crate::middleware::rbac::{Authorized, AuthorsManage, RequirePermission};
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 100;
const MAX_BIO_LENGTH: usize = 5_000;

/// GET /api/v1/authors
pub async fn list_authors(
    State(state): State<AppState>,
    auth: Authorized,
) -> AppResult<Json<DataResponse<Vec<Author>>>> {
    if !auth.can(PERM_AUTHORS_MANAGE) {
        auth.require(PERM_ARTICLES_VIEW)?;
    }
    let authors = AuthorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: authors }))
}

/// POST /api/v1/authors
pub async fn create_author(
    State(state): State<AppState>,
    auth: RequirePermission<AuthorsManage>,
    Json(input): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<DataResponse<Author>>)> {
    require_text("Name", &input.name, MAX_NAME_LENGTH)?;
    validate_profile(
        input.email.as_deref(),
        input.bio.as_deref(),
        input.avatar_url.as_deref(),
    )?;
    ensure_user_exists(&state, input.user_id).await?;

    let slug = resolve_new_slug(&state.pool, SlugScope::Author, input.slug.as_deref(), &input.name)
        .await?;
    let author = AuthorRepo::create(&state.pool, &input, &slug).await?;

    tracing::info!(
        author_id = author.id,
        slug = %author.slug,
        user_id = auth.user_id(),
        "Author created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: author })))
}

/// GET /api/v1/authors/{id}
pub async fn get_author(
    State(state): State<AppState>,
    _auth: RequirePermission<AuthorsManage>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Author>>> {
    let author = AuthorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: author }))
}

/// PUT /api/v1/authors/{id}
pub async fn update_author(
    State(state): State<AppState>,
    auth: RequirePermission<AuthorsManage>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAuthor>,
) -> AppResult<Json<DataResponse<Author>>> {
    if let Some(name) = &input.name {
        require_text("Name", name, MAX_NAME_LENGTH)?;
    }
    validate_profile(
        input.email.as_deref(),
        input.bio.as_deref(),
        input.avatar_url.as_deref(),
    )?;
    ensure_user_exists(&state, input.user_id).await?;
    let input = UpdateAuthor {
        slug: explicit_slug(input.slug.as_deref())?,
        ..input
    };

    let author = AuthorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(author_id = id, user_id = auth.user_id(), "Author updated");
    Ok(Json(DataResponse { data: author }))
}

/// DELETE /api/v1/authors/{id}
///
/// Refused with 409 while any article is credited to the author.
pub async fn delete_author(
    State(state): State<AppState>,
    auth: RequirePermission<AuthorsManage>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AuthorRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(author_id = id, user_id = auth.user_id(), "Author deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Author",
        id,
    })
}

fn validate_profile(
    email: Option<&str>,
    bio: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(email) = email {
        validate_email("Email", email)?;
    }
    if let Some(bio) = bio {
        max_len("Bio", bio, MAX_BIO_LENGTH)?;
    }
    if let Some(url) = avatar_url {
        validate_http_url("Avatar URL", url)?;
    }
    Ok(())
}

/// A linked account must exist; otherwise the request is rejected with 400.
async fn ensure_user_exists(state: &AppState, user_id: Option<DbId>) -> AppResult<()> {
    if let Some(user_id) = user_id {
        if UserRepo::find_by_id(&state.pool, user_id).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "User with id {user_id} does not exist"
            )));
        }
    }
    Ok(())
}
