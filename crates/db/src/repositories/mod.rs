//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-statement writes open
//! their own transaction.

pub mod article_repo;
pub mod author_repo;
pub mod category_repo;
pub mod dashboard_repo;
pub mod lead_note_repo;
pub mod lead_repo;
pub mod permission_repo;
pub mod role_repo;
pub mod session_repo;
pub mod sync;
pub mod task_repo;
pub mod user_repo;

pub use article_repo::ArticleRepo;
pub use author_repo::AuthorRepo;
pub use category_repo::CategoryRepo;
pub use dashboard_repo::DashboardRepo;
pub use lead_note_repo::LeadNoteRepo;
pub use lead_repo::LeadRepo;
pub use permission_repo::PermissionRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use sync::SyncError;
pub use task_repo::TaskRepo;
pub use user_repo::{FailedLogin, UserRepo};
