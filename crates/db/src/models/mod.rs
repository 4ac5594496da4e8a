//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod article;
pub mod author;
pub mod category;
pub mod dashboard;
pub mod lead;
pub mod lead_note;
pub mod permission;
pub mod role;
pub mod session;
pub mod task;
pub mod user;
