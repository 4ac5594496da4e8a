//! Handlers for the `/categories` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pressdesk_core::error::CoreError;
use pressdesk_core::permissions::{PERM_ARTICLES_VIEW, PERM_CATEGORIES_MANAGE};
use pressdesk_core::types::DbId;
use pressdesk_core::validation::{max_len, require_text};
use pressdesk_db::models::category::{Category, CategoryWithCount, CreateCategory, UpdateCategory};
use pressdesk_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::slugs::{explicit_slug, resolve_new_slug, SlugScope};
use crate::middleware::rbac::{Authorized, CategoriesManage, RequirePermission};
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 1_000;

/// GET /api/v1/categories
///
/// Readable by anyone who can view articles or manage categories.
pub async fn list_categories(
    State(state): State<AppState>,
    auth: Authorized,
) -> AppResult<Json<DataResponse<Vec<CategoryWithCount>>>> {
    if !auth.can(PERM_CATEGORIES_MANAGE) {
        auth.require(PERM_ARTICLES_VIEW)?;
    }
    let categories = CategoryRepo::list_with_counts(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: RequirePermission<CategoriesManage>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    validate_fields(Some(&input.name), input.description.as_deref())?;
    let slug =
        resolve_new_slug(&state.pool, SlugScope::Category, input.slug.as_deref(), &input.name)
            .await?;

    let category = CategoryRepo::create(&state.pool, &input, &slug).await?;
    tracing::info!(
        category_id = category.id,
        slug = %category.slug,
        user_id = auth.user_id(),
        "Category created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    _auth: RequirePermission<CategoriesManage>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: category }))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    auth: RequirePermission<CategoriesManage>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    validate_fields(input.name.as_deref(), input.description.as_deref())?;
    let input = UpdateCategory {
        slug: explicit_slug(input.slug.as_deref())?,
        ..input
    };

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(category_id = id, user_id = auth.user_id(), "Category updated");
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
///
/// Refused with 409 while any article is filed under the category.
pub async fn delete_category(
    State(state): State<AppState>,
    auth: RequirePermission<CategoriesManage>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(category_id = id, user_id = auth.user_id(), "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}

fn validate_fields(name: Option<&str>, description: Option<&str>) -> Result<(), CoreError> {
    if let Some(name) = name {
        require_text("Name", name, MAX_NAME_LENGTH)?;
    }
    if let Some(description) = description {
        max_len("Description", description, MAX_DESCRIPTION_LENGTH)?;
    }
    Ok(())
}
