//! Handler for the admin landing page summary.

use axum::extract::State;
use axum::Json;
use pressdesk_core::permissions::{PERM_ARTICLES_VIEW, PERM_LEADS_VIEW};
use pressdesk_db::models::dashboard::DashboardSummary;
use pressdesk_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::handlers::leads::lead_scope;
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Article and lead sections are zeroed for callers without the matching
/// view permission. Task counts always cover the caller's own tasks.
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: Authorized,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let summary = DashboardRepo::summary(
        &state.pool,
        auth.user_id(),
        auth.can(PERM_ARTICLES_VIEW),
        auth.can(PERM_LEADS_VIEW),
        lead_scope(&auth),
    )
    .await?;
    Ok(Json(DataResponse { data: summary }))
}
