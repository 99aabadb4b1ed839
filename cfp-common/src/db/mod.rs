//! Database schema and repository functions

pub mod comments;
pub mod init;
pub mod models;
pub mod ratings;
pub mod sessions;
pub mod talks;
pub mod users;

pub use init::{init_database, open_in_memory};
pub use models::*;
