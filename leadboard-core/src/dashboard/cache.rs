//! Dashboard result cache keyed by filter.
//!
//! Every refresh gets a ticket carrying a generation number. Only the
//! newest ticket may write results; anything older is discarded when it
//! arrives, so a slow response for a previous filter can never overwrite
//! the current view.

use std::collections::HashMap;

use super::{Aggregate, DashboardResults, DashboardSnapshot};
use crate::types::{LeadFilter, StatusPeriod};

/// Identity of a set of dashboard results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DashboardKey {
    pub filter: LeadFilter,
    pub period: StatusPeriod,
}

impl DashboardKey {
    pub fn new(filter: LeadFilter, period: StatusPeriod) -> Self {
        Self { filter, period }
    }
}

/// Handle for one in-flight refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub key: DashboardKey,
}

/// An aggregate whose query failed during a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFailure {
    pub aggregate: Aggregate,
    pub message: String,
}

/// What happened to a completed refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// Results were stored; failed aggregates kept their previous values
    Applied { failures: Vec<AggregateFailure> },
    /// A newer refresh was started after this one
    Discarded,
}

#[derive(Debug, Default)]
struct CacheEntry {
    snapshot: DashboardSnapshot,
    stale: bool,
}

/// Last good results per key plus the refresh currently in flight.
#[derive(Debug, Default)]
pub struct DashboardCache {
    generation: u64,
    pending: Option<RefreshTicket>,
    entries: HashMap<DashboardKey, CacheEntry>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh for `key`, superseding any refresh in flight.
    pub fn begin(&mut self, key: DashboardKey) -> RefreshTicket {
        self.generation += 1;
        let ticket = RefreshTicket {
            generation: self.generation,
            key,
        };
        tracing::debug!(generation = ticket.generation, "Dashboard refresh started");
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Store the results of a refresh if it is still the newest one.
    pub fn complete(&mut self, ticket: &RefreshTicket, results: DashboardResults) -> CompleteOutcome {
        if self.pending.as_ref() != Some(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding superseded dashboard refresh"
            );
            return CompleteOutcome::Discarded;
        }
        self.pending = None;

        let entry = self.entries.entry(ticket.key.clone()).or_default();
        let failures = results.apply_to(&mut entry.snapshot);
        // A partial failure leaves stale values behind; refetch next time
        entry.stale = !failures.is_empty();
        CompleteOutcome::Applied { failures }
    }

    /// Mark every cached entry stale. Values stay visible until replaced.
    pub fn invalidate_all(&mut self) {
        tracing::debug!(entries = self.entries.len(), "Invalidating dashboard cache");
        for entry in self.entries.values_mut() {
            entry.stale = true;
        }
    }

    /// Drop the refresh in flight so its results are discarded on arrival.
    pub fn abandon_pending(&mut self) {
        if let Some(ticket) = self.pending.take() {
            tracing::debug!(generation = ticket.generation, "Abandoning dashboard refresh");
        }
    }

    /// True while a refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Cached results for `key`, if any were ever loaded.
    pub fn snapshot(&self, key: &DashboardKey) -> Option<&DashboardSnapshot> {
        self.entries.get(key).map(|e| &e.snapshot)
    }

    /// True when `key` has no results or its results are out of date.
    pub fn needs_refresh(&self, key: &DashboardKey) -> bool {
        self.entries.get(key).map_or(true, |e| e.stale)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
