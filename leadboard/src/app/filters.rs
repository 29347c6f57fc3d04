use super::*;

use leadboard_core::calendar::parse_date;
use leadboard_core::format::format_date;
use leadboard_core::ALL_TAGS;

impl App {
    // ========== Filter Methods ==========

    /// Open a date prompt prefilled with the current value.
    pub(super) fn begin_date_input(&mut self, mode: InputMode) {
        let current = match mode {
            InputMode::StartDate => self.filter.start_date,
            InputMode::EndDate => self.filter.end_date,
            _ => None,
        };
        self.date_input = current.map(format_date).unwrap_or_default();
        self.input_mode = mode;
    }

    /// Handle keyboard input while a date prompt is open.
    pub(super) fn handle_date_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.date_input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.commit_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '/' || c == '-' => {
                if self.date_input.len() < 10 {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Parse the prompt and apply it. An empty prompt clears that bound.
    fn commit_date_input(&mut self) {
        let input = std::mem::take(&mut self.date_input);
        let date = if input.trim().is_empty() {
            None
        } else {
            match parse_date(&input) {
                Ok(date) => Some(date),
                Err(e) => {
                    // Keep the prompt open so the user can fix it
                    self.date_input = input;
                    self.notify(NoticeKind::Error, e.to_string());
                    return;
                }
            }
        };

        let mut filter = self.filter.clone();
        match self.input_mode {
            InputMode::StartDate => filter.start_date = date,
            InputMode::EndDate => filter.end_date = date,
            _ => {}
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                self.date_input = input;
                self.notify(NoticeKind::Error, "Start date is after end date");
                return;
            }
        }

        self.input_mode = InputMode::Normal;
        self.set_filter(filter);
    }

    /// Move the tag selector to the next (or previous) known tag.
    ///
    /// The selector cycles through "all" followed by every distinct tag.
    pub(super) fn cycle_tag(&mut self, forward: bool) {
        let options: Vec<&str> = std::iter::once(ALL_TAGS)
            .chain(self.tag_options.iter().map(String::as_str))
            .collect();
        let current = self.filter.effective_tag().unwrap_or(ALL_TAGS);
        let idx = options.iter().position(|t| *t == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % options.len()
        } else {
            (idx + options.len() - 1) % options.len()
        };

        let mut filter = self.filter.clone();
        filter.tag = match options[next] {
            ALL_TAGS => None,
            tag => Some(tag.to_string()),
        };
        self.set_filter(filter);
    }

    /// Reset tag, start date and end date.
    pub(super) fn clear_filters(&mut self) {
        if self.filter.is_empty() {
            return;
        }
        self.set_filter(LeadFilter::default());
    }

    /// Label for the tag selector.
    pub fn tag_label(&self) -> &str {
        self.filter.effective_tag().unwrap_or("All tags")
    }

    fn set_filter(&mut self, filter: LeadFilter) {
        if filter == self.filter {
            return;
        }
        tracing::debug!(?filter, "Filter changed");
        self.filter = filter;
        self.table_state.select(None);
        self.load_current();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{key, sample_leads, settle, test_app};
    use super::*;
    use chrono::NaiveDate;
    use leadboard_core::MemorySource;
    use std::sync::Arc;

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn loaded_app() -> App {
        let mut app = test_app(Arc::new(MemorySource::new(sample_leads())));
        app.request_refresh();
        settle(&mut app);
        app
    }

    #[test]
    fn test_start_date_prompt_sets_filter() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.input_mode, InputMode::StartDate);

        type_text(&mut app, "01/11/2025");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.filter.start_date, NaiveDate::from_ymd_opt(2025, 11, 1));
        assert!(app.is_loading());
        settle(&mut app);
    }

    #[test]
    fn test_invalid_date_keeps_prompt_open() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('e')));
        type_text(&mut app, "31/02/2025");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::EndDate);
        assert_eq!(app.date_input, "31/02/2025");
        assert_eq!(app.filter.end_date, None);
        assert_eq!(app.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('e')));
        type_text(&mut app, "01/10/2025");
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app);

        app.handle_key(key(KeyCode::Char('s')));
        type_text(&mut app, "02/10/2025");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::StartDate);
        assert_eq!(app.filter.start_date, None);
    }

    #[test]
    fn test_escape_and_backspace() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('s')));
        type_text(&mut app, "01/1x");
        assert_eq!(app.date_input, "01/1");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.date_input, "01/");
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.filter.is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_tag_cycle_wraps_through_all() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.filter.tag.as_deref(), Some("BIO IGOR"));
        settle(&mut app);
        assert_eq!(app.leads().len(), 2);

        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.filter.tag.as_deref(), Some("CR 17 | LEVA 1"));
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.filter.tag, None);
        app.handle_key(key(KeyCode::Char('T')));
        assert_eq!(app.tag_label(), "CR 17 | LEVA 1");
        settle(&mut app);
    }

    #[test]
    fn test_clear_filters_resets_everything() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('t')));
        app.handle_key(key(KeyCode::Char('s')));
        type_text(&mut app, "2025-11-01");
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app);
        assert!(!app.filter.is_empty());

        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.filter.is_empty());
        settle(&mut app);
        assert_eq!(app.leads().len(), 3);
    }

    #[test]
    fn test_revisited_filter_comes_from_cache() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        let mut app = test_app(source.clone());
        app.request_refresh();
        settle(&mut app);

        app.handle_key(key(KeyCode::Char('t')));
        settle(&mut app);
        let selects = source.select_count();

        app.handle_key(key(KeyCode::Char('c')));
        assert!(!app.is_loading());
        assert_eq!(app.leads().len(), 3);
        app.handle_key(key(KeyCode::Char('t')));
        assert!(!app.is_loading());
        assert_eq!(app.leads().len(), 2);
        assert_eq!(source.select_count(), selects);
    }

    #[test]
    fn test_delete_forces_refetch_of_other_filters() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        let mut app = test_app(source.clone());
        app.request_refresh();
        settle(&mut app);

        // Delete while looking at the tag filter
        app.handle_key(key(KeyCode::Char('t')));
        settle(&mut app);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        settle(&mut app);
        let selects = source.select_count();

        // The unfiltered results were cached before the delete
        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.is_loading());
        settle(&mut app);
        assert!(source.select_count() > selects);
        assert_eq!(app.leads().len(), 2);
    }
}
