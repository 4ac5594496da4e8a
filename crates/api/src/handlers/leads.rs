//! Handlers for `/leads`, their notes, and follow-ups.
//!
//! Callers holding `leads.view_all` see every lead; everyone else sees only
//! leads assigned to them. A lead outside the caller's view answers 404.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pressdesk_core::error::CoreError;
use pressdesk_core::leads::{
    normalize_contact, resolve_closed_at, validate_company, validate_contact, validate_estimated_value,
    validate_first_name, validate_follow_up, validate_last_name, validate_note_body,
    validate_priority, validate_source, validate_status, STATUS_NEW,
};
use pressdesk_core::permissions::{PERM_LEADS_ASSIGN, PERM_LEADS_DELETE, PERM_LEADS_VIEW, PERM_LEADS_VIEW_ALL};
use pressdesk_core::types::{DbId, Timestamp};
use pressdesk_db::models::lead::{CreateLead, Lead, LeadFilter, UpdateLead};
use pressdesk_db::models::lead_note::{CreateLeadNote, LeadNote};
use pressdesk_db::repositories::{LeadNoteRepo, LeadRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{
    Authorized, LeadsAssign, LeadsCreate, LeadsDelete, LeadsEdit, LeadsView, RequirePermission,
};
use crate::query::{non_blank, resolve_page, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /leads`.
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    pub status: Option<String>,
    pub source: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<DbId>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /leads/{id}/assign`. `null` unassigns.
#[derive(Debug, Deserialize)]
pub struct AssignLeadRequest {
    pub user_id: Option<DbId>,
}

/// Request body for `PUT /leads/{id}/follow-up`. `null` clears it.
#[derive(Debug, Deserialize)]
pub struct FollowUpRequest {
    pub next_follow_up_at: Option<Timestamp>,
}

/// A recorded note together with the lead as it stands afterwards.
#[derive(Debug, Serialize)]
pub struct NoteRecorded {
    pub note: LeadNote,
    pub lead: Lead,
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

/// GET /api/v1/leads
pub async fn list_leads(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsView>,
    Query(params): Query<LeadListParams>,
) -> AppResult<Json<DataResponse<Vec<Lead>>>> {
    let status = non_blank(params.status.as_deref());
    let source = non_blank(params.source.as_deref());
    let priority = non_blank(params.priority.as_deref());
    status.map(validate_status).transpose()?;
    source.map(validate_source).transpose()?;
    priority.map(validate_priority).transpose()?;
    let (limit, offset) = resolve_page(params.limit, params.offset);

    let filter = LeadFilter {
        status: status.map(str::to_string),
        source: source.map(str::to_string),
        priority: priority.map(str::to_string),
        assigned_to: params.assigned_to,
        q: non_blank(params.q.as_deref()).map(str::to_string),
        visible_to: lead_scope(&auth),
        limit,
        offset,
    };
    let leads = LeadRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: leads }))
}

/// POST /api/v1/leads
///
/// Assigns the lead to the caller unless `assigned_to` names someone else,
/// which needs `leads.assign`.
pub async fn create_lead(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsCreate>,
    Json(mut input): Json<CreateLead>,
) -> AppResult<(StatusCode, Json<DataResponse<Lead>>)> {
    input.email = normalize_contact(input.email.take());
    input.phone = normalize_contact(input.phone.take());
    validate_first_name(&input.first_name)?;
    validate_profile(
        input.last_name.as_deref(),
        input.company.as_deref(),
        input.estimated_value_cents,
    )?;
    validate_contact(input.email.as_deref(), input.phone.as_deref())?;
    if let Some(status) = &input.status {
        validate_status(status)?;
    }
    if let Some(source) = &input.source {
        validate_source(source)?;
    }
    if let Some(priority) = &input.priority {
        validate_priority(priority)?;
    }
    if let Some(at) = input.next_follow_up_at {
        validate_follow_up(at)?;
    }

    let assigned_to = input.assigned_to.unwrap_or(auth.user_id());
    if assigned_to != auth.user_id() {
        auth.require(PERM_LEADS_ASSIGN)?;
        ensure_active_assignee(&state, assigned_to).await?;
    }

    let status = input.status.as_deref().unwrap_or(STATUS_NEW);
    let closed_at = resolve_closed_at(status, None, Utc::now());
    let lead =
        LeadRepo::create(&state.pool, &input, Some(assigned_to), auth.user_id(), closed_at).await?;

    tracing::info!(
        lead_id = lead.id,
        status = %lead.status,
        assigned_to,
        user_id = auth.user_id(),
        "Lead created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: lead })))
}

/// GET /api/v1/leads/{id}
pub async fn get_lead(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsView>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Lead>>> {
    let lead = find_visible_lead(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: lead }))
}

/// PUT /api/v1/leads/{id}
///
/// Reassigning through this endpoint needs `leads.assign`. Changing the
/// status to `won`/`lost` stamps `closed_at`; reopening clears it.
pub async fn update_lead(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsEdit>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateLead>,
) -> AppResult<Json<DataResponse<Lead>>> {
    input.email = normalize_contact(input.email.take());
    input.phone = normalize_contact(input.phone.take());
    if let Some(first_name) = &input.first_name {
        validate_first_name(first_name)?;
    }
    validate_profile(
        input.last_name.as_deref(),
        input.company.as_deref(),
        input.estimated_value_cents,
    )?;
    if let Some(status) = &input.status {
        validate_status(status)?;
    }
    if let Some(source) = &input.source {
        validate_source(source)?;
    }
    if let Some(priority) = &input.priority {
        validate_priority(priority)?;
    }

    let existing = find_visible_lead(&state, &auth, id).await?;
    validate_contact(
        input.email.as_deref().or(existing.email.as_deref()),
        input.phone.as_deref().or(existing.phone.as_deref()),
    )?;

    if let Some(assignee) = input.assigned_to {
        if existing.assigned_to != Some(assignee) {
            auth.require(PERM_LEADS_ASSIGN)?;
            ensure_active_assignee(&state, assignee).await?;
        }
    }

    let closed_at = input
        .status
        .as_deref()
        .and_then(|status| resolve_closed_at(status, existing.closed_at, Utc::now()));

    let lead = LeadRepo::update(&state.pool, id, &input, closed_at)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        lead_id = id,
        status = %lead.status,
        user_id = auth.user_id(),
        "Lead updated"
    );
    Ok(Json(DataResponse { data: lead }))
}

/// DELETE /api/v1/leads/{id}
pub async fn delete_lead(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsDelete>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_visible_lead(&state, &auth, id).await?;
    LeadRepo::delete(&state.pool, id).await?;
    tracing::info!(lead_id = id, user_id = auth.user_id(), "Lead deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/leads/{id}/assign
pub async fn assign_lead(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsAssign>,
    Path(id): Path<DbId>,
    Json(input): Json<AssignLeadRequest>,
) -> AppResult<Json<DataResponse<Lead>>> {
    find_visible_lead(&state, &auth, id).await?;
    if let Some(user_id) = input.user_id {
        ensure_active_assignee(&state, user_id).await?;
    }

    let lead = LeadRepo::assign(&state.pool, id, input.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        lead_id = id,
        assigned_to = ?input.user_id,
        user_id = auth.user_id(),
        "Lead assigned"
    );
    Ok(Json(DataResponse { data: lead }))
}

// ---------------------------------------------------------------------------
// Notes and follow-ups
// ---------------------------------------------------------------------------

/// GET /api/v1/leads/{id}/notes
pub async fn list_notes(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsView>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<LeadNote>>>> {
    find_visible_lead(&state, &auth, id).await?;
    let notes = LeadNoteRepo::list_for_lead(&state.pool, id).await?;
    Ok(Json(DataResponse { data: notes }))
}

/// POST /api/v1/leads/{id}/notes
///
/// A contact note stamps `last_contacted_at` and moves a `new` lead to
/// `contacted`; `next_follow_up_at`, when given, must be in the future.
pub async fn create_note(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsEdit>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateLeadNote>,
) -> AppResult<(StatusCode, Json<DataResponse<NoteRecorded>>)> {
    validate_note_body(&input.body)?;
    if let Some(at) = input.next_follow_up_at {
        validate_follow_up(at)?;
    }
    find_visible_lead(&state, &auth, id).await?;

    let (note, lead) = LeadNoteRepo::record(&state.pool, id, auth.user_id(), &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        lead_id = id,
        note_id = note.id,
        is_contact = note.is_contact,
        user_id = auth.user_id(),
        "Lead note recorded"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: NoteRecorded { note, lead },
        }),
    ))
}

/// DELETE /api/v1/leads/{id}/notes/{note_id}
///
/// Allowed for the note's author or holders of `leads.delete`.
pub async fn delete_note(
    State(state): State<AppState>,
    auth: Authorized,
    Path((id, note_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    auth.require(PERM_LEADS_VIEW)?;
    find_visible_lead(&state, &auth, id).await?;

    let note = LeadNoteRepo::find_by_id(&state.pool, id, note_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Note",
            id: note_id,
        })?;
    if note.user_id != Some(auth.user_id()) {
        auth.require(PERM_LEADS_DELETE)?;
    }

    LeadNoteRepo::delete(&state.pool, note_id).await?;
    tracing::info!(lead_id = id, note_id, user_id = auth.user_id(), "Lead note deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/leads/{id}/follow-up
pub async fn set_follow_up(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsEdit>,
    Path(id): Path<DbId>,
    Json(input): Json<FollowUpRequest>,
) -> AppResult<Json<DataResponse<Lead>>> {
    if let Some(at) = input.next_follow_up_at {
        validate_follow_up(at)?;
    }
    find_visible_lead(&state, &auth, id).await?;

    let lead = LeadRepo::set_follow_up(&state.pool, id, input.next_follow_up_at)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        lead_id = id,
        next_follow_up_at = ?lead.next_follow_up_at,
        user_id = auth.user_id(),
        "Lead follow-up set"
    );
    Ok(Json(DataResponse { data: lead }))
}

/// GET /api/v1/leads/follow-ups/due
///
/// Open leads visible to the caller whose follow-up time has passed,
/// earliest first.
pub async fn due_follow_ups(
    State(state): State<AppState>,
    auth: RequirePermission<LeadsView>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Lead>>>> {
    let (limit, _) = params.resolve();
    let leads = LeadRepo::due_follow_ups(&state.pool, lead_scope(&auth), limit).await?;
    Ok(Json(DataResponse { data: leads }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `None` when the caller sees every lead, otherwise their own user id.
pub(crate) fn lead_scope(auth: &Authorized) -> Option<DbId> {
    if auth.can(PERM_LEADS_VIEW_ALL) {
        None
    } else {
        Some(auth.user_id())
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Lead", id })
}

async fn find_visible_lead(state: &AppState, auth: &Authorized, id: DbId) -> AppResult<Lead> {
    let lead = LeadRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    match lead_scope(auth) {
        Some(user_id) if lead.assigned_to != Some(user_id) => Err(not_found(id)),
        _ => Ok(lead),
    }
}

async fn ensure_active_assignee(state: &AppState, user_id: DbId) -> AppResult<()> {
    if !UserRepo::is_active(&state.pool, user_id).await? {
        return Err(AppError::BadRequest(format!(
            "User with id {user_id} is not an active user"
        )));
    }
    Ok(())
}

fn validate_profile(
    last_name: Option<&str>,
    company: Option<&str>,
    estimated_value_cents: Option<i64>,
) -> Result<(), CoreError> {
    if let Some(last_name) = last_name {
        validate_last_name(last_name)?;
    }
    if let Some(company) = company {
        validate_company(company)?;
    }
    if let Some(cents) = estimated_value_cents {
        validate_estimated_value(cents)?;
    }
    Ok(())
}
