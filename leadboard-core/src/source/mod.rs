//! Lead sources.
//!
//! A [`LeadSource`] is the only way the dashboard touches lead data. It
//! understands a deliberately small query language ([`LeadQuery`]): column
//! selection, equality and range filters, and descending order. Three
//! implementations exist:
//!
//! - [`RestSource`]: the hosted lead table behind a PostgREST-style API
//! - [`crate::Database`]: a local SQLite table with the same columns
//! - [`MemorySource`]: an in-memory fake for tests

pub mod memory;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{SourceConfig, SourceKind};
use crate::db::Database;
use crate::error::Result;
use crate::types::{Column, DeleteOutcome, Lead, LeadFilter, LeadId};

pub use memory::MemorySource;
pub use rest::RestSource;

/// A row predicate understood by every source.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Column equals the given text
    Eq(Column, String),
    /// Timestamp column is at or after the instant
    Gte(Column, DateTime<Utc>),
    /// Timestamp column is at or before the instant
    Lte(Column, DateTime<Utc>),
}

impl Condition {
    /// Evaluate against an in-memory lead.
    pub fn matches(&self, lead: &Lead) -> bool {
        match self {
            Condition::Eq(Column::Id, value) => lead.id.to_string() == *value,
            Condition::Eq(column, value) => lead.text(*column) == Some(value.as_str()),
            Condition::Gte(column, ts) => timestamp(lead, *column).is_some_and(|t| t >= *ts),
            Condition::Lte(column, ts) => timestamp(lead, *column).is_some_and(|t| t <= *ts),
        }
    }
}

fn timestamp(lead: &Lead, column: Column) -> Option<DateTime<Utc>> {
    match column {
        Column::CreatedAt => lead.created_at,
        _ => None,
    }
}

/// Which columns a query returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    Columns(Vec<Column>),
}

/// A select against the lead table.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadQuery {
    pub selection: Selection,
    pub conditions: Vec<Condition>,
    /// Column to order by, descending; missing values sort last
    pub order_desc: Option<Column>,
}

impl LeadQuery {
    /// Select every column.
    pub fn all() -> Self {
        Self {
            selection: Selection::All,
            conditions: Vec::new(),
            order_desc: None,
        }
    }

    /// Select only the given columns (the identifier is always included).
    pub fn columns(columns: &[Column]) -> Self {
        Self {
            selection: Selection::Columns(columns.to_vec()),
            conditions: Vec::new(),
            order_desc: None,
        }
    }

    pub fn eq(mut self, column: Column, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq(column, value.into()));
        self
    }

    pub fn gte(mut self, column: Column, ts: DateTime<Utc>) -> Self {
        self.conditions.push(Condition::Gte(column, ts));
        self
    }

    pub fn lte(mut self, column: Column, ts: DateTime<Utc>) -> Self {
        self.conditions.push(Condition::Lte(column, ts));
        self
    }

    pub fn order_desc(mut self, column: Column) -> Self {
        self.order_desc = Some(column);
        self
    }

    /// Add the conditions of a dashboard filter.
    pub fn filtered(mut self, filter: &LeadFilter, now: DateTime<Utc>) -> Self {
        if let Some(tag) = filter.effective_tag() {
            self = self.eq(Column::Tag, tag);
        }
        let (lower, upper) = filter.time_bounds(now);
        if let Some(lower) = lower {
            self = self.gte(Column::CreatedAt, lower);
        }
        if let Some(upper) = upper {
            self = self.lte(Column::CreatedAt, upper);
        }
        self
    }

    /// Columns the query returns, identifier first.
    pub fn selected_columns(&self) -> Vec<Column> {
        match &self.selection {
            Selection::All => Column::ALL.to_vec(),
            Selection::Columns(columns) => {
                let mut out = vec![Column::Id];
                out.extend(columns.iter().copied().filter(|c| *c != Column::Id));
                out
            }
        }
    }

    /// True if every condition holds for the lead.
    pub fn matches(&self, lead: &Lead) -> bool {
        self.conditions.iter().all(|c| c.matches(lead))
    }
}

/// Read and delete access to the lead table.
#[async_trait]
pub trait LeadSource: Send + Sync {
    /// Short human-readable description, used in logs and the header.
    fn describe(&self) -> String;

    /// Run a select.
    async fn select(&self, query: &LeadQuery) -> Result<Vec<Lead>>;

    /// Delete the row with this identifier.
    ///
    /// Deleting an identifier that does not exist is not an error; it yields
    /// [`DeleteOutcome::NotFound`].
    async fn delete(&self, id: LeadId) -> Result<DeleteOutcome>;
}

/// Open the source described by the configuration.
pub fn open_source(config: &SourceConfig) -> Result<Arc<dyn LeadSource>> {
    config.validate()?;
    match config.kind {
        SourceKind::Rest => Ok(Arc::new(RestSource::new(config)?)),
        SourceKind::Sqlite => {
            let path = config.sqlite_path();
            tracing::info!(path = %path.display(), "Opening local lead store");
            let db = Database::open(&path)?;
            db.migrate()?;
            Ok(Arc::new(db))
        }
    }
}
