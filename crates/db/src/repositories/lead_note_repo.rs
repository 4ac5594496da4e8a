//! Repository for `lead_notes` and the contact workflow they drive.

use pressdesk_core::leads::status_after_contact;
use pressdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::lead::Lead;
use crate::models::lead_note::{CreateLeadNote, LeadNote};
use crate::repositories::lead_repo::COLUMNS as LEAD_COLUMNS;

/// Note columns joined with the author's name; `n` is the note, `u` the user.
const NOTE_PROJECTION: &str = "n.id, n.lead_id, n.user_id, u.name AS author_name, n.body, \
                               n.is_contact, n.created_at, n.updated_at";

/// Provides operations for lead notes.
pub struct LeadNoteRepo;

impl LeadNoteRepo {
    /// Notes on a lead, oldest first.
    pub async fn list_for_lead(pool: &PgPool, lead_id: DbId) -> Result<Vec<LeadNote>, sqlx::Error> {
        let query = format!(
            "SELECT {NOTE_PROJECTION}
             FROM lead_notes n
             LEFT JOIN users u ON u.id = n.user_id
             WHERE n.lead_id = $1
             ORDER BY n.created_at ASC, n.id ASC"
        );
        sqlx::query_as::<_, LeadNote>(&query)
            .bind(lead_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        lead_id: DbId,
        note_id: DbId,
    ) -> Result<Option<LeadNote>, sqlx::Error> {
        let query = format!(
            "SELECT {NOTE_PROJECTION}
             FROM lead_notes n
             LEFT JOIN users u ON u.id = n.user_id
             WHERE n.lead_id = $1 AND n.id = $2"
        );
        sqlx::query_as::<_, LeadNote>(&query)
            .bind(lead_id)
            .bind(note_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a note and apply its effects on the lead in one transaction.
    ///
    /// A contact note stamps `last_contacted_at` and moves a `new` lead to
    /// `contacted`. A follow-up time, when given, replaces the lead's.
    /// Returns `None` if the lead does not exist.
    pub async fn record(
        pool: &PgPool,
        lead_id: DbId,
        user_id: DbId,
        input: &CreateLeadNote,
    ) -> Result<Option<(LeadNote, Lead)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM leads WHERE id = $1 FOR UPDATE")
                .bind(lead_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(status) = status else {
            return Ok(None);
        };

        let insert = format!(
            "WITH n AS (
                INSERT INTO lead_notes (lead_id, user_id, body, is_contact)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {NOTE_PROJECTION}
             FROM n
             LEFT JOIN users u ON u.id = n.user_id"
        );
        let note = sqlx::query_as::<_, LeadNote>(&insert)
            .bind(lead_id)
            .bind(user_id)
            .bind(&input.body)
            .bind(input.is_contact)
            .fetch_one(&mut *tx)
            .await?;

        let update = format!(
            "UPDATE leads SET
                last_contacted_at = CASE WHEN $2 THEN NOW() ELSE last_contacted_at END,
                status = $3,
                next_follow_up_at = COALESCE($4, next_follow_up_at)
             WHERE id = $1
             RETURNING {LEAD_COLUMNS}"
        );
        let next_status = if input.is_contact {
            status_after_contact(&status)
        } else {
            status.as_str()
        };
        let lead = sqlx::query_as::<_, Lead>(&update)
            .bind(lead_id)
            .bind(input.is_contact)
            .bind(next_status)
            .bind(input.next_follow_up_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            lead_id,
            note_id = note.id,
            is_contact = input.is_contact,
            status = %lead.status,
            "Lead note recorded"
        );
        Ok(Some((note, lead)))
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, note_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lead_notes WHERE id = $1")
            .bind(note_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
