//! # CFP Common Library
//!
//! Shared code for the call-for-papers service:
//! - Database schema and repository functions
//! - Talk rating strategies and strategy selection
//! - Talk access policy and role gating
//! - Call-for-proposals window
//! - Talk filtering, sorting and pagination for review queues
//! - Configuration loading

pub mod access;
pub mod auth;
pub mod cfp;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod rating;
pub mod talk_filter;

pub use cfp::CallForProposals;
pub use db::models::{Identity, Role};
pub use error::{Error, Result};
pub use rating::{RatingScheme, TalkRating};
