//! # leadboard-core
//!
//! Core library for leadboard - a terminal dashboard for a marketing lead table.
//!
//! This library provides:
//! - Domain types for leads, filters and aggregate results
//! - Lead sources: a hosted PostgREST-style table, a local SQLite store, and
//!   an in-memory fake
//! - Aggregations over fetched leads (tag rankings, daily histogram,
//!   potential value, status breakdown)
//! - A dashboard query layer with a generation-checked cache and a
//!   background worker
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use leadboard_core::{dashboard::DashboardQueries, source, Config, LeadFilter, StatusPeriod};
//!
//! let config = Config::load().expect("failed to load config");
//! let source = source::open_source(&config.source).expect("failed to open source");
//! let queries = DashboardQueries::new(source, &config.dashboard);
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let snapshot = runtime
//!     .block_on(queries.snapshot(&LeadFilter::default(), StatusPeriod::All, chrono::Utc::now()))
//!     .expect("query failed");
//! println!("{} leads", snapshot.stats.map(|s| s.total_leads).unwrap_or(0));
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use dashboard::{DashboardCache, DashboardQueries, DashboardSnapshot, DashboardWorker};
pub use db::Database;
pub use error::{Error, Result};
pub use source::{LeadQuery, LeadSource, MemorySource, RestSource};
pub use types::*;

// Public modules
pub mod analytics;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod lookup;
pub mod source;
pub mod types;
