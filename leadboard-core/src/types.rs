//! Core domain types for leadboard
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Lead** | A prospective contact captured through a landing page |
//! | **Tag** | Free-text label grouping leads by acquisition campaign |
//! | **Potential bracket** | Categorical revenue estimate, mapped to a value via a fixed table |
//! | **Aggregate** | A summary value derived by reducing over a lead collection |
//!
//! Optional lead fields are `None` when absent. An empty string is a real
//! value and is never treated as missing.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::lookup::Rgb;

/// Stable identifier of a lead row.
pub type LeadId = i64;

/// Tag selector value meaning "no tag filter".
pub const ALL_TAGS: &str = "all";

// ============================================
// Lead
// ============================================

/// One row of the lead table.
///
/// Field names on the wire follow the hosted table's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Unique, immutable identifier
    pub id: LeadId,
    /// When the lead was captured
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "nome")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "telefone")]
    pub phone: Option<String>,
    /// Revenue bracket label (e.g. "até 50k", "+500k")
    #[serde(default, rename = "fat_deposito")]
    pub potential: Option<String>,
    /// Campaign tag
    #[serde(default)]
    pub tag: Option<String>,
    /// Board card the lead was copied to, if any
    #[serde(default, rename = "id_trello")]
    pub board_card_id: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Lead {
    /// A lead with only the identifier and timestamp set.
    pub fn new(id: LeadId, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            created_at,
            name: None,
            email: None,
            phone: None,
            potential: None,
            tag: None,
            board_card_id: None,
            instagram: None,
            expertise: None,
            status: None,
        }
    }

    /// Local calendar date the lead was captured on.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.created_at.map(calendar::local_date)
    }

    /// Value of a text column, `None` when absent.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Name => self.name.as_deref(),
            Column::Email => self.email.as_deref(),
            Column::Phone => self.phone.as_deref(),
            Column::Potential => self.potential.as_deref(),
            Column::Tag => self.tag.as_deref(),
            Column::BoardCardId => self.board_card_id.as_deref(),
            Column::Instagram => self.instagram.as_deref(),
            Column::Expertise => self.expertise.as_deref(),
            Column::Status => self.status.as_deref(),
            Column::Id | Column::CreatedAt => None,
        }
    }

    /// Keep only the given columns, clearing everything else.
    ///
    /// The identifier always survives.
    pub fn project(mut self, columns: &[Column]) -> Self {
        let keep = |c: Column| columns.contains(&c);
        if !keep(Column::CreatedAt) {
            self.created_at = None;
        }
        if !keep(Column::Name) {
            self.name = None;
        }
        if !keep(Column::Email) {
            self.email = None;
        }
        if !keep(Column::Phone) {
            self.phone = None;
        }
        if !keep(Column::Potential) {
            self.potential = None;
        }
        if !keep(Column::Tag) {
            self.tag = None;
        }
        if !keep(Column::BoardCardId) {
            self.board_card_id = None;
        }
        if !keep(Column::Instagram) {
            self.instagram = None;
        }
        if !keep(Column::Expertise) {
            self.expertise = None;
        }
        if !keep(Column::Status) {
            self.status = None;
        }
        self
    }
}

/// Columns of the lead table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    CreatedAt,
    Name,
    Email,
    Phone,
    Potential,
    Tag,
    BoardCardId,
    Instagram,
    Expertise,
    Status,
}

impl Column {
    /// Every column, in table order.
    pub const ALL: [Column; 11] = [
        Column::Id,
        Column::CreatedAt,
        Column::Name,
        Column::Email,
        Column::Phone,
        Column::Potential,
        Column::Tag,
        Column::BoardCardId,
        Column::Instagram,
        Column::Expertise,
        Column::Status,
    ];

    /// Column name in the lead table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::CreatedAt => "created_at",
            Column::Name => "nome",
            Column::Email => "email",
            Column::Phone => "telefone",
            Column::Potential => "fat_deposito",
            Column::Tag => "tag",
            Column::BoardCardId => "id_trello",
            Column::Instagram => "instagram",
            Column::Expertise => "expertise",
            Column::Status => "status",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Filter
// ============================================

/// Transient filter state chosen in the UI.
///
/// Doubles as the cache key for dashboard results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LeadFilter {
    /// Tag to match; `None` or [`ALL_TAGS`] disables the tag filter
    pub tag: Option<String>,
    /// First day included
    pub start_date: Option<NaiveDate>,
    /// Last day included
    pub end_date: Option<NaiveDate>,
}

impl LeadFilter {
    /// The tag to filter on, ignoring the "all" sentinel.
    pub fn effective_tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| *t != ALL_TAGS)
    }

    /// True when the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.effective_tag().is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// Timestamp bounds for the date range, both inclusive.
    ///
    /// The start date begins at local midnight; the end date runs to the last
    /// millisecond of that local day. A start date without an end date is
    /// bounded above by `now`.
    pub fn time_bounds(
        &self,
        now: DateTime<Utc>,
    ) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let lower = self.start_date.map(calendar::start_of_day);
        let upper = match (self.start_date, self.end_date) {
            (_, Some(end)) => Some(calendar::end_of_day(end)),
            (Some(_), None) => Some(now),
            (None, None) => None,
        };
        (lower, upper)
    }

    /// Check a lead against this filter.
    pub fn matches(&self, lead: &Lead, now: DateTime<Utc>) -> bool {
        if let Some(tag) = self.effective_tag() {
            if lead.tag.as_deref() != Some(tag) {
                return false;
            }
        }
        let (lower, upper) = self.time_bounds(now);
        if lower.is_none() && upper.is_none() {
            return true;
        }
        let Some(ts) = lead.created_at else {
            return false;
        };
        lower.map_or(true, |l| ts >= l) && upper.map_or(true, |u| ts <= u)
    }
}

// ============================================
// Windows and periods
// ============================================

/// Calendar window for the daily histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramWindow {
    /// Explicit inclusive range
    Range { start: NaiveDate, end: NaiveDate },
    /// The last `n` days, ending today
    LastDays(u32),
}

impl HistogramWindow {
    /// Pick the window for a filter: its date range if it has one, otherwise
    /// the last `days` days. An open end runs to `today`.
    pub fn for_filter(filter: &LeadFilter, days: u32, today: NaiveDate) -> Self {
        match (filter.start_date, filter.end_date) {
            (Some(start), end) => HistogramWindow::Range {
                start,
                end: end.unwrap_or(today),
            },
            (None, Some(end)) => HistogramWindow::Range {
                start: end - Duration::days(i64::from(days.max(1)) - 1),
                end,
            },
            (None, None) => HistogramWindow::LastDays(days),
        }
    }

    /// First and last day of the window. `None` when the window is empty.
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            HistogramWindow::Range { start, end } if start <= end => Some((start, end)),
            HistogramWindow::Range { .. } => None,
            HistogramWindow::LastDays(0) => None,
            HistogramWindow::LastDays(n) => {
                Some((today - Duration::days(i64::from(n) - 1), today))
            }
        }
    }

    /// Every day in the window, oldest first.
    pub fn days(&self, today: NaiveDate) -> Vec<NaiveDate> {
        match self.bounds(today) {
            Some((start, end)) => start.iter_days().take_while(|d| *d <= end).collect(),
            None => Vec::new(),
        }
    }
}

/// Period selector for the status breakdown panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPeriod {
    #[default]
    All,
    Week,
    Month,
    Year,
}

impl StatusPeriod {
    /// First day of the period containing `today`. `None` for [`StatusPeriod::All`].
    ///
    /// Weeks start on Monday.
    pub fn since(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            StatusPeriod::All => None,
            StatusPeriod::Week => Some(
                today - Duration::days(i64::from(today.weekday().num_days_from_monday())),
            ),
            StatusPeriod::Month => today.with_day(1),
            StatusPeriod::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1),
        }
    }

    /// Next period in selector order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            StatusPeriod::All => StatusPeriod::Week,
            StatusPeriod::Week => StatusPeriod::Month,
            StatusPeriod::Month => StatusPeriod::Year,
            StatusPeriod::Year => StatusPeriod::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusPeriod::All => "All",
            StatusPeriod::Week => "This week",
            StatusPeriod::Month => "This month",
            StatusPeriod::Year => "This year",
        }
    }
}

// ============================================
// Mutation outcome
// ============================================

/// Result of a successful delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// A row was removed
    Deleted,
    /// No row had this identifier; nothing changed
    NotFound,
}

// ============================================
// Aggregates
// ============================================

/// A label with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

impl NamedCount {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Headline numbers for the stat and insight cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadStats {
    pub total_leads: usize,
    pub best_tag: NamedCount,
    pub worst_tag: NamedCount,
    pub top_expertise: NamedCount,
    /// Mean leads per distinct capture day, one decimal place
    pub average_leads_per_day: f64,
}

/// Lead count for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Lead count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyLeadCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// One entry of the status breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSlice {
    pub status: String,
    pub count: usize,
    /// Share of the total, rounded to a whole percent
    pub percentage: u32,
    pub color: Rgb,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_all_sentinel_disables_tag_filter() {
        let filter = LeadFilter {
            tag: Some(ALL_TAGS.to_string()),
            ..Default::default()
        };
        assert_eq!(filter.effective_tag(), None);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_start_only_is_bounded_by_now() {
        let now = local(2025, 11, 3, 12, 0);
        let filter = LeadFilter {
            start_date: Some(day(2025, 11, 1)),
            ..Default::default()
        };
        let (lower, upper) = filter.time_bounds(now);
        assert_eq!(lower, Some(local(2025, 11, 1, 0, 0)));
        assert_eq!(upper, Some(now));
    }

    #[test]
    fn test_end_date_includes_whole_day() {
        let now = local(2025, 11, 10, 12, 0);
        let filter = LeadFilter {
            end_date: Some(day(2025, 11, 3)),
            ..Default::default()
        };
        let mut lead = Lead::new(1, Some(local(2025, 11, 3, 23, 59)));
        assert!(filter.matches(&lead, now));
        lead.created_at = Some(local(2025, 11, 4, 0, 0));
        assert!(!filter.matches(&lead, now));
    }

    #[test]
    fn test_date_filter_rejects_missing_timestamp() {
        let filter = LeadFilter {
            start_date: Some(day(2025, 1, 1)),
            ..Default::default()
        };
        assert!(!filter.matches(&Lead::new(1, None), Utc::now()));
        assert!(LeadFilter::default().matches(&Lead::new(1, None), Utc::now()));
    }

    #[test]
    fn test_tag_filter_does_not_match_missing_tag() {
        let filter = LeadFilter {
            tag: Some("BIO IGOR".to_string()),
            ..Default::default()
        };
        let mut lead = Lead::new(1, None);
        assert!(!filter.matches(&lead, Utc::now()));
        lead.tag = Some("BIO IGOR".to_string());
        assert!(filter.matches(&lead, Utc::now()));
    }

    #[test]
    fn test_last_days_window() {
        let today = day(2025, 3, 2);
        let days = HistogramWindow::LastDays(3).days(today);
        assert_eq!(days, vec![day(2025, 2, 28), day(2025, 3, 1), day(2025, 3, 2)]);
        assert!(HistogramWindow::LastDays(0).days(today).is_empty());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let window = HistogramWindow::Range {
            start: day(2025, 3, 5),
            end: day(2025, 3, 1),
        };
        assert!(window.days(day(2025, 3, 10)).is_empty());
    }

    #[test]
    fn test_window_for_filter() {
        let today = day(2025, 6, 15);
        let open_start = LeadFilter {
            start_date: Some(day(2025, 6, 10)),
            ..Default::default()
        };
        assert_eq!(
            HistogramWindow::for_filter(&open_start, 30, today),
            HistogramWindow::Range {
                start: day(2025, 6, 10),
                end: today
            }
        );
        let end_only = LeadFilter {
            end_date: Some(day(2025, 6, 1)),
            ..Default::default()
        };
        assert_eq!(
            HistogramWindow::for_filter(&end_only, 7, today).days(today).len(),
            7
        );
        assert_eq!(
            HistogramWindow::for_filter(&LeadFilter::default(), 30, today),
            HistogramWindow::LastDays(30)
        );
    }

    #[test]
    fn test_status_period_since() {
        // 2025-06-12 is a Thursday
        let today = day(2025, 6, 12);
        assert_eq!(StatusPeriod::All.since(today), None);
        assert_eq!(StatusPeriod::Week.since(today), Some(day(2025, 6, 9)));
        assert_eq!(StatusPeriod::Month.since(today), Some(day(2025, 6, 1)));
        assert_eq!(StatusPeriod::Year.since(today), Some(day(2025, 1, 1)));
        assert_eq!(StatusPeriod::Year.next(), StatusPeriod::All);
    }

    #[test]
    fn test_project_keeps_id_and_selected_columns() {
        let mut lead = Lead::new(7, Some(Utc::now()));
        lead.tag = Some("A".to_string());
        lead.email = Some("a@example.com".to_string());
        let narrowed = lead.project(&[Column::Tag]);
        assert_eq!(narrowed.id, 7);
        assert_eq!(narrowed.tag.as_deref(), Some("A"));
        assert!(narrowed.email.is_none());
        assert!(narrowed.created_at.is_none());
    }

    #[test]
    fn test_deserialize_wire_row() {
        let json = r#"{
            "id": 12,
            "created_at": "2025-11-03T16:40:00.123+00:00",
            "nome": "Fernanda",
            "email": null,
            "telefone": "34991118103",
            "fat_deposito": "até 50k",
            "tag": "BIO IGOR"
        }"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.id, 12);
        assert_eq!(lead.name.as_deref(), Some("Fernanda"));
        assert_eq!(lead.email, None);
        assert_eq!(lead.potential.as_deref(), Some("até 50k"));
        assert_eq!(lead.status, None);
        assert!(lead.created_at.is_some());
    }
}
