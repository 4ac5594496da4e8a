//! Leads, notes, follow-ups, and tasks against a real database.

use chrono::{Duration, Utc};
use pressdesk_db::models::lead::{CreateLead, LeadFilter, UpdateLead};
use pressdesk_db::models::lead_note::CreateLeadNote;
use pressdesk_db::models::task::{CreateTask, TaskFilter, UpdateTask};
use pressdesk_db::models::user::CreateUser;
use pressdesk_db::repositories::{
    DashboardRepo, LeadNoteRepo, LeadRepo, TaskRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: format!("User {email}"),
            email: email.into(),
            password_hash: "$argon2id$placeholder".into(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_lead(first_name: &str) -> CreateLead {
    CreateLead {
        first_name: first_name.into(),
        last_name: None,
        email: Some(format!("{}@example.com", first_name.to_lowercase())),
        phone: None,
        company: None,
        source: None,
        status: None,
        priority: None,
        estimated_value_cents: None,
        assigned_to: None,
        next_follow_up_at: None,
    }
}

fn new_task(title: &str) -> CreateTask {
    CreateTask {
        title: title.into(),
        description: None,
        status: None,
        priority: None,
        due_at: None,
        assigned_to: None,
        lead_id: None,
    }
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lead_defaults(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    let lead = LeadRepo::create(&pool, &new_lead("Grace"), Some(agent), agent, None)
        .await
        .unwrap();
    assert_eq!(lead.status, "new");
    assert_eq!(lead.source, "other");
    assert_eq!(lead.priority, "medium");
    assert_eq!(lead.assigned_to, Some(agent));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contact_check_constraint(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    let input = CreateLead {
        email: None,
        ..new_lead("Nobody")
    };
    let err = LeadRepo::create(&pool, &input, None, agent, None)
        .await
        .unwrap_err();
    let sqlx::Error::Database(db_err) = err else {
        panic!("expected a database error");
    };
    assert_eq!(db_err.constraint(), Some("ck_leads_contact"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contact_note_advances_new_lead(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    let lead = LeadRepo::create(&pool, &new_lead("Linus"), Some(agent), agent, None)
        .await
        .unwrap();
    let follow_up = Utc::now() + Duration::days(2);

    let (note, updated) = LeadNoteRepo::record(
        &pool,
        lead.id,
        agent,
        &CreateLeadNote {
            body: "Called, interested".into(),
            is_contact: true,
            next_follow_up_at: Some(follow_up),
        },
    )
    .await
    .unwrap()
    .expect("lead exists");

    assert_eq!(note.author_name.as_deref(), Some("User agent@example.com"));
    assert_eq!(updated.status, "contacted");
    assert!(updated.last_contacted_at.is_some());
    assert_eq!(
        updated.next_follow_up_at.map(|t| t.timestamp()),
        Some(follow_up.timestamp())
    );

    // A plain note changes neither status nor contact time.
    let (_, again) = LeadNoteRepo::record(
        &pool,
        lead.id,
        agent,
        &CreateLeadNote {
            body: "Internal remark".into(),
            is_contact: false,
            next_follow_up_at: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(again.status, "contacted");
    assert_eq!(again.last_contacted_at, updated.last_contacted_at);
    assert_eq!(again.next_follow_up_at, updated.next_follow_up_at);

    let notes = LeadNoteRepo::list_for_lead(&pool, lead.id).await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, note.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_on_missing_lead_returns_none(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    let result = LeadNoteRepo::record(
        &pool,
        123_456,
        agent,
        &CreateLeadNote {
            body: "Hello".into(),
            is_contact: true,
            next_follow_up_at: None,
        },
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_visibility_and_due_follow_ups(pool: PgPool) {
    let alice = user(&pool, "alice@example.com").await;
    let bob = user(&pool, "bob@example.com").await;
    let mine = LeadRepo::create(&pool, &new_lead("Mine"), Some(alice), alice, None)
        .await
        .unwrap();
    let theirs = LeadRepo::create(&pool, &new_lead("Theirs"), Some(bob), bob, None)
        .await
        .unwrap();

    let past = Utc::now() - Duration::hours(1);
    LeadRepo::set_follow_up(&pool, mine.id, Some(past)).await.unwrap();
    LeadRepo::set_follow_up(&pool, theirs.id, Some(past)).await.unwrap();

    let visible = LeadRepo::list(
        &pool,
        &LeadFilter {
            visible_to: Some(alice),
            limit: 25,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, mine.id);

    assert_eq!(LeadRepo::due_follow_ups(&pool, Some(alice), 50).await.unwrap().len(), 1);
    assert_eq!(LeadRepo::due_follow_ups(&pool, None, 50).await.unwrap().len(), 2);

    // Closed leads drop out of the due list.
    LeadRepo::update(
        &pool,
        theirs.id,
        &UpdateLead {
            status: Some("won".into()),
            ..Default::default()
        },
        Some(Utc::now()),
    )
    .await
    .unwrap();
    assert_eq!(LeadRepo::due_follow_ups(&pool, None, 50).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_without_status_keeps_closed_at(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    let closed = Utc::now() - Duration::days(1);
    let input = CreateLead {
        status: Some("lost".into()),
        ..new_lead("Closed")
    };
    let lead = LeadRepo::create(&pool, &input, Some(agent), agent, Some(closed))
        .await
        .unwrap();

    let updated = LeadRepo::update(
        &pool,
        lead.id,
        &UpdateLead {
            company: Some("Acme".into()),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.company.as_deref(), Some("Acme"));
    assert_eq!(updated.closed_at, lead.closed_at);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_completion_and_overdue_filter(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    let overdue = TaskRepo::create(
        &pool,
        &CreateTask {
            due_at: Some(Utc::now() - Duration::days(1)),
            ..new_task("Late")
        },
        Some(agent),
        agent,
        None,
    )
    .await
    .unwrap();
    TaskRepo::create(&pool, &new_task("Undated"), Some(agent), agent, None)
        .await
        .unwrap();

    let late = TaskRepo::list(
        &pool,
        &TaskFilter {
            overdue: Some(true),
            limit: 25,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(late.len(), 1);
    assert_eq!(late[0].id, overdue.id);

    let on_time = TaskRepo::list(
        &pool,
        &TaskFilter {
            overdue: Some(false),
            limit: 25,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(on_time.len(), 1);

    assert_eq!(TaskRepo::counts_for_assignee(&pool, agent).await.unwrap(), (2, 1));

    let done = TaskRepo::complete(&pool, overdue.id).await.unwrap().unwrap();
    assert_eq!(done.status, "completed");
    assert!(done.completed_at.is_some());

    let reopened = TaskRepo::update(
        &pool,
        overdue.id,
        &UpdateTask {
            status: Some("pending".into()),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap()
    .unwrap();
    assert!(reopened.completed_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_lead_unlinks_tasks(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    let lead = LeadRepo::create(&pool, &new_lead("Temp"), Some(agent), agent, None)
        .await
        .unwrap();
    let task = TaskRepo::create(
        &pool,
        &CreateTask {
            lead_id: Some(lead.id),
            ..new_task("Call back")
        },
        Some(agent),
        agent,
        None,
    )
    .await
    .unwrap();

    assert!(LeadRepo::delete(&pool, lead.id).await.unwrap());
    let task = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert!(task.lead_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_summary(pool: PgPool) {
    let agent = user(&pool, "agent@example.com").await;
    LeadRepo::create(&pool, &new_lead("One"), Some(agent), agent, None)
        .await
        .unwrap();
    LeadRepo::create(&pool, &new_lead("Two"), None, agent, None)
        .await
        .unwrap();

    let all = DashboardRepo::summary(&pool, agent, true, true, None)
        .await
        .unwrap();
    assert_eq!(all.leads_by_status.len(), 1);
    assert_eq!(all.leads_by_status[0].count, 2);
    assert_eq!(all.articles.published, 0);

    let scoped = DashboardRepo::summary(&pool, agent, false, true, Some(agent))
        .await
        .unwrap();
    assert_eq!(scoped.leads_by_status[0].count, 1);
    assert_eq!(scoped.my_tasks.open, 0);
}
