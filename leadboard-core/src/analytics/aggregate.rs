//! Single-pass reductions over a lead collection.
//!
//! Every function here is pure: the caller fetches the leads, these only
//! count. Rankings order by count descending, then by label ascending.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::lookup::{self, MISSING_EXPERTISE, MISSING_STATUS, MISSING_TAG, NO_RANKING};
use crate::types::{
    Column, DailyLeadCount, HistogramWindow, Lead, LeadStats, NamedCount, StatusSlice, TagCount,
};

/// Number of entries in the tag bar chart.
pub const TOP_TAGS: usize = 10;

/// Label substituted when `column` is empty on a lead.
pub fn missing_label(column: Column) -> &'static str {
    match column {
        Column::Tag => MISSING_TAG,
        Column::Expertise => MISSING_EXPERTISE,
        Column::Status => MISSING_STATUS,
        _ => "—",
    }
}

/// Count leads per distinct value of `column`.
///
/// Absent values are grouped under [`missing_label`].
pub fn group_and_count(leads: &[Lead], column: Column) -> HashMap<String, usize> {
    let fallback = missing_label(column);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for lead in leads {
        let key = lead.text(column).unwrap_or(fallback);
        *counts.entry(key.to_string()).or_default() += 1;
    }
    counts
}

/// Order groups by count descending, ties by label ascending.
pub fn rank(counts: HashMap<String, usize>) -> Vec<NamedCount> {
    let mut ranked: Vec<NamedCount> = counts
        .into_iter()
        .map(|(name, count)| NamedCount { name, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked
}

/// First entry of a ranking, or `("N/A", 0)`.
pub fn best(ranked: &[NamedCount]) -> NamedCount {
    ranked
        .first()
        .cloned()
        .unwrap_or_else(|| NamedCount::new(NO_RANKING, 0))
}

/// Last entry of a ranking, or `("N/A", 0)`.
pub fn worst(ranked: &[NamedCount]) -> NamedCount {
    ranked
        .last()
        .cloned()
        .unwrap_or_else(|| NamedCount::new(NO_RANKING, 0))
}

/// The `limit` most frequent tags.
pub fn top_tags(leads: &[Lead], limit: usize) -> Vec<TagCount> {
    rank(group_and_count(leads, Column::Tag))
        .into_iter()
        .take(limit)
        .map(|NamedCount { name, count }| TagCount { tag: name, count })
        .collect()
}

/// Mean leads per distinct local capture date, one decimal place.
///
/// Leads without a timestamp still count towards the total but add no date.
pub fn daily_average(leads: &[Lead]) -> f64 {
    let dates: BTreeSet<NaiveDate> = leads.iter().filter_map(Lead::local_date).collect();
    if dates.is_empty() {
        return 0.0;
    }
    let average = leads.len() as f64 / dates.len() as f64;
    (average * 10.0).round() / 10.0
}

/// Per-day counts for every day of `window`, zero-filled.
pub fn daily_histogram(
    leads: &[Lead],
    window: HistogramWindow,
    today: NaiveDate,
) -> Vec<DailyLeadCount> {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for date in leads.iter().filter_map(Lead::local_date) {
        *per_day.entry(date).or_default() += 1;
    }
    window
        .days(today)
        .into_iter()
        .map(|date| DailyLeadCount {
            date,
            count: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Sum of the mapped value of every lead's potential bracket.
pub fn total_potential(leads: &[Lead]) -> u64 {
    leads
        .iter()
        .filter_map(|lead| lead.potential.as_deref())
        .filter_map(lookup::potential_value)
        .sum()
}

/// Percentage of `count` in `total`, rounded; 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

/// Status counts with share and display color, most frequent first.
pub fn status_breakdown(leads: &[Lead]) -> Vec<StatusSlice> {
    let total = leads.len();
    rank(group_and_count(leads, Column::Status))
        .into_iter()
        .map(|NamedCount { name, count }| StatusSlice {
            percentage: percentage(count, total),
            color: lookup::status_color(&name),
            status: name,
            count,
        })
        .collect()
}

/// Tag with the most high-potential leads.
pub fn top_potential_tag(leads: &[Lead]) -> NamedCount {
    let high: Vec<Lead> = leads
        .iter()
        .filter(|l| l.potential.as_deref().is_some_and(lookup::is_high_potential))
        .cloned()
        .collect();
    best(&rank(group_and_count(&high, Column::Tag)))
}

/// Headline statistics for the cards.
pub fn lead_stats(leads: &[Lead]) -> LeadStats {
    let tags = rank(group_and_count(leads, Column::Tag));
    let expertise = rank(group_and_count(leads, Column::Expertise));
    LeadStats {
        total_leads: leads.len(),
        best_tag: best(&tags),
        worst_tag: worst(&tags),
        top_expertise: best(&expertise),
        average_leads_per_day: daily_average(leads),
    }
}

/// Distinct tag values present, sorted. Leads without a tag are skipped.
pub fn distinct_tags(leads: &[Lead]) -> Vec<String> {
    leads
        .iter()
        .filter_map(|l| l.tag.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
