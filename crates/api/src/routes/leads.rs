//! Route definitions for the `/leads` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::leads;
use crate::state::AppState;

/// Routes mounted at `/leads`.
///
/// ```text
/// GET    /                         -> list_leads
/// POST   /                         -> create_lead
/// GET    /follow-ups/due           -> due_follow_ups
/// GET    /{id}                     -> get_lead
/// PUT    /{id}                     -> update_lead
/// DELETE /{id}                     -> delete_lead
/// POST   /{id}/assign              -> assign_lead
/// PUT    /{id}/follow-up           -> set_follow_up
/// GET    /{id}/notes               -> list_notes
/// POST   /{id}/notes               -> create_note
/// DELETE /{id}/notes/{note_id}     -> delete_note
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list_leads).post(leads::create_lead))
        .route("/follow-ups/due", get(leads::due_follow_ups))
        .route(
            "/{id}",
            get(leads::get_lead)
                .put(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/{id}/assign", post(leads::assign_lead))
        .route("/{id}/follow-up", put(leads::set_follow_up))
        .route(
            "/{id}/notes",
            get(leads::list_notes).post(leads::create_note),
        )
        .route("/{id}/notes/{note_id}", delete(leads::delete_note))
}
