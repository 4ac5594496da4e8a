//! Domain rules for PressDesk that do not touch I/O.
//!
//! Everything here is pure: validation, vocabularies, publication and
//! pipeline state resolution, slug handling, and join-table sync planning.
//! The `db` and `api` crates build on these.

pub mod articles;
pub mod error;
pub mod leads;
pub mod pagination;
pub mod permissions;
pub mod slug;
pub mod sync;
pub mod tasks;
pub mod types;
pub mod validation;
