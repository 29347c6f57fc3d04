//! Aggregate statistics over lead collections.
//!
//! The functions in [`aggregate`] reduce an already fetched slice of leads to
//! the values shown on the dashboard: counts per tag, expertise and status,
//! best and worst tags, the daily histogram, and the estimated potential.

pub mod aggregate;

pub use aggregate::{
    best, daily_average, daily_histogram, distinct_tags, group_and_count, lead_stats,
    missing_label, percentage, rank, status_breakdown, top_potential_tag, top_tags,
    total_potential, worst, TOP_TAGS,
};
