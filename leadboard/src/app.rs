//! Application state for the TUI.

mod delete;
mod filters;

use leadboard_core::dashboard::{
    CompleteOutcome, DashboardCache, DashboardKey, DashboardSnapshot, DashboardWorker, WorkerEvent,
};
use leadboard_core::{Lead, LeadFilter, LeadId, StatusPeriod};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;

/// Ticks a notice stays on screen (~5 seconds at 100ms per tick).
const NOTICE_TICKS: u32 = 50;

/// What keystrokes currently go to.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputMode {
    /// Dashboard navigation
    #[default]
    Normal,
    /// Typing the start date
    StartDate,
    /// Typing the end date
    EndDate,
    /// Waiting for the user to confirm a delete
    ConfirmDelete { id: LeadId, label: String },
}

/// Severity of a status-line notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// One-line notification shown in the footer.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// Tick the notice was raised on
    pub raised_at: u32,
}

/// Main application state.
pub struct App {
    /// Query thread
    worker: DashboardWorker,
    /// Results per filter
    cache: DashboardCache,
    /// Where leads come from, for the header
    pub source_label: String,
    /// Days in the evolution chart when no date range is set
    pub history_days: u32,
    /// Active filter
    pub filter: LeadFilter,
    /// Period for the status breakdown
    pub status_period: StatusPeriod,
    /// Distinct tags seen in the source
    pub tag_options: Vec<String>,
    /// Where keystrokes go
    pub input_mode: InputMode,
    /// Text typed into a date prompt
    pub date_input: String,
    /// Leads table selection state
    pub table_state: TableState,
    /// Current status-line notice
    pub notice: Option<Notice>,
    /// Deletes sent to the worker and not yet answered
    pub deletes_in_flight: usize,
    /// Current tick count (incremented each loop iteration)
    pub tick_count: u32,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl App {
    /// Create a new App around a running worker.
    pub fn new(worker: DashboardWorker, source_label: String, history_days: u32) -> Self {
        Self {
            worker,
            cache: DashboardCache::new(),
            source_label,
            history_days,
            filter: LeadFilter::default(),
            status_period: StatusPeriod::default(),
            tag_options: Vec::new(),
            input_mode: InputMode::default(),
            date_input: String::new(),
            table_state: TableState::default(),
            notice: None,
            deletes_in_flight: 0,
            tick_count: 0,
            should_quit: false,
        }
    }

    /// Cache key for what is on screen.
    pub fn current_key(&self) -> DashboardKey {
        DashboardKey::new(self.filter.clone(), self.status_period)
    }

    /// Results for the current filter, possibly stale.
    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.cache.snapshot(&self.current_key())
    }

    /// True while a refresh is outstanding.
    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    /// Rows for the leads table.
    pub fn leads(&self) -> &[Lead] {
        self.snapshot()
            .and_then(|s| s.leads.as_deref())
            .unwrap_or(&[])
    }

    /// The lead under the table cursor.
    pub fn selected_lead(&self) -> Option<&Lead> {
        self.table_state
            .selected()
            .and_then(|idx| self.leads().get(idx))
    }

    /// Ask the worker to recompute every aggregate for the current filter.
    pub fn request_refresh(&mut self) {
        let ticket = self.cache.begin(self.current_key());
        if let Err(e) = self.worker.request_refresh(ticket) {
            tracing::error!(error = %e, "Failed to queue refresh");
            self.notify(NoticeKind::Error, format!("Refresh failed: {}", e));
        }
    }

    /// Show results for the current filter, refetching only when the cache
    /// has none or they were invalidated.
    pub fn load_current(&mut self) {
        if self.cache.needs_refresh(&self.current_key()) {
            self.request_refresh();
            return;
        }
        tracing::debug!(filter = ?self.filter, "Serving dashboard from cache");
        // A refresh for the previous filter no longer matters
        self.cache.abandon_pending();
        self.absorb_tag_options();
        self.clamp_selection();
    }

    /// Apply everything the worker has finished since the last call.
    pub fn poll_worker(&mut self) {
        while let Some(event) = self.worker.try_recv() {
            self.handle_worker_event(event);
        }
    }

    fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Refreshed { ticket, results } => {
                match self.cache.complete(&ticket, results) {
                    CompleteOutcome::Applied { failures } => {
                        if let Some(first) = failures.first() {
                            tracing::warn!(
                                failed = failures.len(),
                                aggregate = first.aggregate.label(),
                                error = %first.message,
                                "Dashboard refresh partially failed"
                            );
                            let more = match failures.len() {
                                1 => String::new(),
                                n => format!(" (+{} more)", n - 1),
                            };
                            self.notify(
                                NoticeKind::Error,
                                format!(
                                    "Failed to load {}: {}{}",
                                    first.aggregate.label(),
                                    first.message,
                                    more
                                ),
                            );
                        }
                        self.absorb_tag_options();
                        self.clamp_selection();
                    }
                    CompleteOutcome::Discarded => {}
                }
            }
            WorkerEvent::Deleted { id, result } => self.handle_delete_result(id, result),
        }
    }

    fn absorb_tag_options(&mut self) {
        if let Some(tags) = self.snapshot().and_then(|s| s.tag_options.clone()) {
            self.tag_options = tags;
        }
    }

    /// Raise a status-line notice, replacing any current one.
    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
            raised_at: self.tick_count,
        });
    }

    /// Advance the clock and expire old notices.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        if let Some(notice) = &self.notice {
            if self.tick_count.wrapping_sub(notice.raised_at) > NOTICE_TICKS {
                self.notice = None;
            }
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::StartDate | InputMode::EndDate => self.handle_date_key(key),
            InputMode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    /// Handle keyboard input on the dashboard.
    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.request_refresh();
            }
            KeyCode::Char('s') => {
                self.begin_date_input(InputMode::StartDate);
            }
            KeyCode::Char('e') => {
                self.begin_date_input(InputMode::EndDate);
            }
            KeyCode::Char('t') | KeyCode::Tab => {
                self.cycle_tag(true);
            }
            KeyCode::Char('T') | KeyCode::BackTab => {
                self.cycle_tag(false);
            }
            KeyCode::Char('c') => {
                self.clear_filters();
            }
            KeyCode::Char('p') => {
                self.status_period = self.status_period.next();
                self.load_current();
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.confirm_delete_selected();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.select_first();
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.select_last();
            }
            _ => {}
        }
    }

    /// Select the next row in the table.
    fn select_next(&mut self) {
        let len = self.leads().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Select the previous row in the table.
    fn select_previous(&mut self) {
        let len = self.leads().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    /// Select the first row.
    fn select_first(&mut self) {
        if !self.leads().is_empty() {
            self.table_state.select(Some(0));
        }
    }

    /// Select the last row.
    fn select_last(&mut self) {
        let len = self.leads().len();
        if len > 0 {
            self.table_state.select(Some(len - 1));
        }
    }

    /// Keep the cursor on a valid row after the rows changed.
    fn clamp_selection(&mut self) {
        let len = self.leads().len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crossterm::event::KeyModifiers;
    use leadboard_core::config::DashboardConfig;
    use leadboard_core::dashboard::DashboardQueries;
    use leadboard_core::MemorySource;
    use std::sync::Arc;
    use std::time::Instant;

    pub(crate) fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub(crate) fn sample_leads() -> Vec<Lead> {
        let now = Utc::now();
        let mut leads = Vec::new();
        for (id, tag, potential, status) in [
            (1, "BIO IGOR", "+500k", "Novo"),
            (2, "BIO IGOR", "até 50k", "Em contato"),
            (3, "CR 17 | LEVA 1", "Até 200k", "Novo"),
        ] {
            let mut lead = Lead::new(id, Some(now - Duration::hours(id)));
            lead.name = Some(format!("Lead {}", id));
            lead.email = Some(format!("lead{}@example.com", id));
            lead.tag = Some(tag.to_string());
            lead.potential = Some(potential.to_string());
            lead.status = Some(status.to_string());
            leads.push(lead);
        }
        leads
    }

    pub(crate) fn test_app(source: Arc<MemorySource>) -> App {
        let queries = DashboardQueries::new(source, &DashboardConfig::default());
        let worker = DashboardWorker::spawn(queries).unwrap();
        App::new(worker, "memory".to_string(), 30)
    }

    /// Poll until nothing is outstanding.
    pub(crate) fn settle(app: &mut App) {
        let deadline = Instant::now() + std::time::Duration::from_secs(5);
        loop {
            app.poll_worker();
            if !app.is_loading() && app.deletes_in_flight == 0 {
                return;
            }
            assert!(Instant::now() < deadline, "worker did not settle");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    #[test]
    fn test_initial_refresh_populates_snapshot() {
        let mut app = test_app(Arc::new(MemorySource::new(sample_leads())));
        assert!(app.snapshot().is_none());

        app.request_refresh();
        assert!(app.is_loading());
        settle(&mut app);

        assert_eq!(app.leads().len(), 3);
        assert_eq!(app.table_state.selected(), Some(0));
        assert_eq!(app.tag_options, vec!["BIO IGOR", "CR 17 | LEVA 1"]);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_failed_refresh_notifies_and_keeps_values() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        let mut app = test_app(source.clone());
        app.request_refresh();
        settle(&mut app);

        source.set_fail_selects(true);
        app.handle_key(key(KeyCode::Char('r')));
        settle(&mut app);

        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.starts_with("Failed to load"));
        assert_eq!(app.leads().len(), 3);
    }

    #[test]
    fn test_table_navigation_wraps() {
        let mut app = test_app(Arc::new(MemorySource::new(sample_leads())));
        app.request_refresh();
        settle(&mut app);

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.table_state.selected(), Some(2));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.table_state.selected(), Some(0));
        app.handle_key(key(KeyCode::Char('G')));
        assert_eq!(app.selected_lead().map(|l| l.id), Some(3));
    }

    #[test]
    fn test_period_toggle_refreshes() {
        let mut app = test_app(Arc::new(MemorySource::new(sample_leads())));
        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.status_period, StatusPeriod::Week);
        assert!(app.is_loading());
        settle(&mut app);
        assert!(app.snapshot().is_some());
    }

    #[test]
    fn test_notice_expires() {
        let mut app = test_app(Arc::new(MemorySource::default()));
        app.notify(NoticeKind::Info, "hello");
        for _ in 0..NOTICE_TICKS {
            app.tick();
        }
        assert!(app.notice.is_some());
        app.tick();
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_quit() {
        let mut app = test_app(Arc::new(MemorySource::default()));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
