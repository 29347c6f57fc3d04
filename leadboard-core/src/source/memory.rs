//! In-memory lead source.
//!
//! Used by tests and demos in place of the hosted table. Failures can be
//! switched on to exercise the error paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{LeadQuery, LeadSource};
use crate::error::{Error, Result};
use crate::types::{DeleteOutcome, Lead, LeadId};

/// Lead source backed by a `Vec`.
#[derive(Default)]
pub struct MemorySource {
    rows: Mutex<Vec<Lead>>,
    fail_selects: AtomicBool,
    fail_deletes: AtomicBool,
    selects: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemorySource {
    pub fn new(rows: Vec<Lead>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// Make every select fail until switched back.
    pub fn set_fail_selects(&self, fail: bool) {
        self.fail_selects.store(fail, Ordering::SeqCst);
    }

    /// Make every delete fail until switched back.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of selects served so far (including failed ones).
    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    /// Number of delete requests received so far.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Current rows, unordered.
    pub fn snapshot(&self) -> Result<Vec<Lead>> {
        Ok(self.rows()?.clone())
    }

    pub fn len(&self) -> usize {
        self.rows().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<Lead>>> {
        self.rows
            .lock()
            .map_err(|_| Error::DataSource("memory source lock poisoned".to_string()))
    }
}

#[async_trait]
impl LeadSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn select(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(Error::DataSource("select rejected".to_string()));
        }

        let columns = query.selected_columns();
        let mut rows: Vec<Lead> = self
            .rows()?
            .iter()
            .filter(|lead| query.matches(lead))
            .cloned()
            .collect();

        if query.order_desc.is_some() {
            // Only created_at is orderable; None sorts last
            rows.sort_by(|a, b| match (a.created_at, b.created_at) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }

        Ok(rows
            .into_iter()
            .map(|lead| lead.project(&columns))
            .collect())
    }

    async fn delete(&self, id: LeadId) -> Result<DeleteOutcome> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::DataSource("delete rejected".to_string()));
        }

        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|lead| lead.id != id);
        if rows.len() < before {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}
