//! Local lead store
//!
//! SQLite-backed implementation of [`crate::LeadSource`] with:
//! - Schema migrations
//! - Query translation from [`crate::source::LeadQuery`] to SQL

pub mod repo;
pub mod schema;

pub use repo::Database;
