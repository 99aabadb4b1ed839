//! HTTP API handlers for cfp-server

pub mod account;
pub mod auth;
pub mod health;
pub mod review;
pub mod speakers;
pub mod talks;

pub use auth::{auth_middleware, require_admin, require_reviewer};
pub use health::health_routes;
