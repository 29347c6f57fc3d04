//! Dashboard query layer.
//!
//! [`DashboardQueries`] issues one filtered fetch per aggregate against an
//! injected [`LeadSource`] and reduces the rows with [`crate::analytics`].
//! A full refresh runs every aggregate concurrently and reports each result
//! independently, so one failing query never hides the others.
//!
//! [`DashboardCache`] keeps the last good values per filter and discards
//! responses that were superseded by a newer refresh. [`DashboardWorker`]
//! runs queries off the UI thread.

pub mod cache;
pub mod worker;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics;
use crate::calendar;
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::source::{LeadQuery, LeadSource};
use crate::types::{
    Column, DailyLeadCount, DeleteOutcome, HistogramWindow, Lead, LeadFilter, LeadId, LeadStats,
    NamedCount, StatusPeriod, StatusSlice, TagCount,
};

pub use cache::{AggregateFailure, CompleteOutcome, DashboardCache, DashboardKey, RefreshTicket};
pub use worker::{DashboardWorker, WorkerEvent};

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Leads,
    Stats,
    TagCounts,
    DailyCounts,
    Potential,
    PotentialTag,
    Statuses,
    TagOptions,
}

impl Aggregate {
    pub fn label(&self) -> &'static str {
        match self {
            Aggregate::Leads => "leads",
            Aggregate::Stats => "lead stats",
            Aggregate::TagCounts => "leads by tag",
            Aggregate::DailyCounts => "daily leads",
            Aggregate::Potential => "total potential",
            Aggregate::PotentialTag => "top potential tag",
            Aggregate::Statuses => "status breakdown",
            Aggregate::TagOptions => "tag list",
        }
    }
}

/// Outcome of one refresh, each aggregate reported on its own.
#[derive(Debug)]
pub struct DashboardResults {
    pub leads: Result<Vec<Lead>>,
    pub stats: Result<LeadStats>,
    pub tag_counts: Result<Vec<TagCount>>,
    pub daily_counts: Result<Vec<DailyLeadCount>>,
    pub potential: Result<u64>,
    pub potential_tag: Result<NamedCount>,
    pub statuses: Result<Vec<StatusSlice>>,
    pub tag_options: Result<Vec<String>>,
}

/// Last known value of every aggregate. `None` until first loaded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub leads: Option<Vec<Lead>>,
    pub stats: Option<LeadStats>,
    pub tag_counts: Option<Vec<TagCount>>,
    pub daily_counts: Option<Vec<DailyLeadCount>>,
    pub potential: Option<u64>,
    pub potential_tag: Option<NamedCount>,
    pub statuses: Option<Vec<StatusSlice>>,
    pub tag_options: Option<Vec<String>>,
}

fn merge<T>(
    slot: &mut Option<T>,
    result: Result<T>,
    aggregate: Aggregate,
    failures: &mut Vec<AggregateFailure>,
) {
    match result {
        Ok(value) => *slot = Some(value),
        Err(e) => failures.push(AggregateFailure {
            aggregate,
            message: e.to_string(),
        }),
    }
}

impl DashboardResults {
    /// Write successful values into the snapshot, keeping old values where a
    /// query failed. Returns the failures.
    pub fn apply_to(self, snapshot: &mut DashboardSnapshot) -> Vec<AggregateFailure> {
        let mut failures = Vec::new();
        merge(&mut snapshot.leads, self.leads, Aggregate::Leads, &mut failures);
        merge(&mut snapshot.stats, self.stats, Aggregate::Stats, &mut failures);
        merge(
            &mut snapshot.tag_counts,
            self.tag_counts,
            Aggregate::TagCounts,
            &mut failures,
        );
        merge(
            &mut snapshot.daily_counts,
            self.daily_counts,
            Aggregate::DailyCounts,
            &mut failures,
        );
        merge(
            &mut snapshot.potential,
            self.potential,
            Aggregate::Potential,
            &mut failures,
        );
        merge(
            &mut snapshot.potential_tag,
            self.potential_tag,
            Aggregate::PotentialTag,
            &mut failures,
        );
        merge(
            &mut snapshot.statuses,
            self.statuses,
            Aggregate::Statuses,
            &mut failures,
        );
        merge(
            &mut snapshot.tag_options,
            self.tag_options,
            Aggregate::TagOptions,
            &mut failures,
        );
        failures
    }
}

/// Aggregate queries against an injected lead source.
#[derive(Clone)]
pub struct DashboardQueries {
    source: Arc<dyn LeadSource>,
    history_days: u32,
    top_tags: usize,
}

impl DashboardQueries {
    pub fn new(source: Arc<dyn LeadSource>, config: &DashboardConfig) -> Self {
        Self {
            source,
            history_days: config.history_days,
            top_tags: config.top_tags,
        }
    }

    pub fn source(&self) -> &Arc<dyn LeadSource> {
        &self.source
    }

    /// Days in the evolution chart when no date range is set.
    pub fn history_days(&self) -> u32 {
        self.history_days
    }

    async fn select(&self, query: LeadQuery) -> Result<Vec<Lead>> {
        let rows = self.source.select(&query).await;
        match &rows {
            Ok(rows) => tracing::debug!(rows = rows.len(), ?query, "Lead query complete"),
            Err(e) => tracing::warn!(error = %e, ?query, "Lead query failed"),
        }
        rows
    }

    /// Every lead matching the filter, newest first.
    pub async fn fetch_leads(&self, filter: &LeadFilter, now: DateTime<Utc>) -> Result<Vec<Lead>> {
        self.select(
            LeadQuery::all()
                .filtered(filter, now)
                .order_desc(Column::CreatedAt),
        )
        .await
    }

    /// Totals, best and worst tag, top expertise, and daily average.
    pub async fn lead_stats(&self, filter: &LeadFilter, now: DateTime<Utc>) -> Result<LeadStats> {
        let leads = self
            .select(
                LeadQuery::columns(&[Column::CreatedAt, Column::Tag, Column::Expertise])
                    .filtered(filter, now),
            )
            .await?;
        Ok(analytics::lead_stats(&leads))
    }

    /// Most frequent tags, descending.
    pub async fn leads_by_tag(
        &self,
        filter: &LeadFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<TagCount>> {
        let leads = self
            .select(LeadQuery::columns(&[Column::Tag]).filtered(filter, now))
            .await?;
        Ok(analytics::top_tags(&leads, self.top_tags))
    }

    /// Daily counts over the filter's date range, or the configured number of
    /// days ending today when no range is set.
    pub async fn daily_leads(
        &self,
        filter: &LeadFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyLeadCount>> {
        let today = calendar::local_date(now);
        let window = HistogramWindow::for_filter(filter, self.history_days, today);
        self.daily_leads_in(window, filter, now).await
    }

    /// Daily counts over an explicit window. The tag filter still applies.
    pub async fn daily_leads_in(
        &self,
        window: HistogramWindow,
        filter: &LeadFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyLeadCount>> {
        let today = calendar::local_date(now);
        let Some((first, last)) = window.bounds(today) else {
            return Ok(Vec::new());
        };
        let window_filter = LeadFilter {
            tag: filter.tag.clone(),
            start_date: Some(first),
            end_date: Some(last),
        };
        let leads = self
            .select(LeadQuery::columns(&[Column::CreatedAt]).filtered(&window_filter, now))
            .await?;
        Ok(analytics::daily_histogram(&leads, window, today))
    }

    /// Estimated monetary potential of the matching leads.
    pub async fn total_potential(&self, filter: &LeadFilter, now: DateTime<Utc>) -> Result<u64> {
        let leads = self
            .select(LeadQuery::columns(&[Column::Potential]).filtered(filter, now))
            .await?;
        Ok(analytics::total_potential(&leads))
    }

    /// Tag with the most high-potential leads.
    pub async fn top_potential_tag(
        &self,
        filter: &LeadFilter,
        now: DateTime<Utc>,
    ) -> Result<NamedCount> {
        let leads = self
            .select(LeadQuery::columns(&[Column::Potential, Column::Tag]).filtered(filter, now))
            .await?;
        Ok(analytics::top_potential_tag(&leads))
    }

    /// Status counts, narrowed further to the selected period.
    pub async fn status_breakdown(
        &self,
        filter: &LeadFilter,
        period: StatusPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<StatusSlice>> {
        let mut narrowed = filter.clone();
        if let Some(since) = period.since(calendar::local_date(now)) {
            narrowed.start_date = Some(narrowed.start_date.map_or(since, |s| s.max(since)));
        }
        let leads = self
            .select(LeadQuery::columns(&[Column::Status]).filtered(&narrowed, now))
            .await?;
        Ok(analytics::status_breakdown(&leads))
    }

    /// Distinct tags in the whole source, for the tag selector.
    pub async fn tag_options(&self) -> Result<Vec<String>> {
        let leads = self.select(LeadQuery::columns(&[Column::Tag])).await?;
        Ok(analytics::distinct_tags(&leads))
    }

    /// Delete a lead. Not retried on failure.
    pub async fn delete_lead(&self, id: LeadId) -> Result<DeleteOutcome> {
        match self.source.delete(id).await {
            Ok(outcome) => {
                tracing::info!(id, ?outcome, "Lead delete complete");
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Lead delete failed");
                Err(e)
            }
        }
    }

    /// Recompute every aggregate concurrently.
    pub async fn refresh(
        &self,
        filter: &LeadFilter,
        period: StatusPeriod,
        now: DateTime<Utc>,
    ) -> DashboardResults {
        let (leads, stats, tag_counts, daily_counts, potential, potential_tag, statuses, tag_options) = tokio::join!(
            self.fetch_leads(filter, now),
            self.lead_stats(filter, now),
            self.leads_by_tag(filter, now),
            self.daily_leads(filter, now),
            self.total_potential(filter, now),
            self.top_potential_tag(filter, now),
            self.status_breakdown(filter, period, now),
            self.tag_options(),
        );
        DashboardResults {
            leads,
            stats,
            tag_counts,
            daily_counts,
            potential,
            potential_tag,
            statuses,
            tag_options,
        }
    }

    /// Recompute every aggregate, failing on the first error.
    ///
    /// Used by the report CLI where partial output is not useful.
    pub async fn snapshot(
        &self,
        filter: &LeadFilter,
        period: StatusPeriod,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot> {
        let mut snapshot = DashboardSnapshot::default();
        let failures = self.refresh(filter, period, now).await.apply_to(&mut snapshot);
        match failures.into_iter().next() {
            Some(failure) => Err(Error::DataSource(format!(
                "{}: {}",
                failure.aggregate.label(),
                failure.message
            ))),
            None => Ok(snapshot),
        }
    }
}
