pub mod articles;
pub mod auth;
pub mod authors;
pub mod categories;
pub mod dashboard;
pub mod leads;
pub mod public;
pub mod roles;
pub mod slugs;
pub mod tasks;
pub mod users;
