use super::*;

use leadboard_core::{DeleteOutcome, Result as CoreResult};

impl App {
    // ========== Delete Methods ==========

    /// Ask for confirmation before deleting the selected lead.
    pub(super) fn confirm_delete_selected(&mut self) {
        if self.is_loading() {
            return;
        }
        let Some(lead) = self.selected_lead() else {
            return;
        };
        let id = lead.id;
        let label = lead
            .name
            .clone()
            .or_else(|| lead.email.clone())
            .unwrap_or_else(|| format!("#{}", id));
        self.input_mode = InputMode::ConfirmDelete { id, label };
    }

    /// Handle keyboard input in the delete confirmation prompt.
    pub(super) fn handle_confirm_key(&mut self, key: KeyEvent) {
        let InputMode::ConfirmDelete { id, .. } = self.input_mode else {
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.request_delete(id);
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn request_delete(&mut self, id: LeadId) {
        tracing::info!(id, "Deleting lead");
        match self.worker.request_delete(id) {
            Ok(()) => {
                self.deletes_in_flight += 1;
                self.notify(NoticeKind::Info, "Deleting lead...");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to queue delete");
                self.notify(NoticeKind::Error, format!("Delete failed: {}", e));
            }
        }
    }

    /// React to a finished delete.
    ///
    /// Any successful delete makes every cached aggregate stale. A failed
    /// delete leaves the cache alone.
    pub(super) fn handle_delete_result(&mut self, id: LeadId, result: CoreResult<DeleteOutcome>) {
        self.deletes_in_flight = self.deletes_in_flight.saturating_sub(1);
        match result {
            Ok(outcome) => {
                let text = match outcome {
                    DeleteOutcome::Deleted => "Lead deleted",
                    DeleteOutcome::NotFound => "Lead was already gone",
                };
                self.notify(NoticeKind::Success, text);
                self.cache.invalidate_all();
                self.request_refresh();
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Delete failed");
                self.notify(NoticeKind::Error, format!("Delete failed: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{key, sample_leads, settle, test_app};
    use super::*;
    use leadboard_core::MemorySource;
    use std::sync::Arc;

    fn loaded(source: &Arc<MemorySource>) -> App {
        let mut app = test_app(source.clone());
        app.request_refresh();
        settle(&mut app);
        app
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        let mut app = loaded(&source);

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(
            app.input_mode,
            InputMode::ConfirmDelete {
                id: 1,
                label: "Lead 1".to_string()
            }
        );

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.input_mode, InputMode::Normal);
        settle(&mut app);
        assert_eq!(source.delete_count(), 0);
    }

    #[test]
    fn test_confirmed_delete_refreshes_everything() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        let mut app = loaded(&source);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        settle(&mut app);

        assert_eq!(source.delete_count(), 1);
        assert_eq!(app.leads().len(), 2);
        assert!(app.leads().iter().all(|l| l.id != 2));
        let stats = app.snapshot().and_then(|s| s.stats.as_ref()).unwrap();
        assert_eq!(stats.total_leads, 2);
        assert_eq!(app.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[test]
    fn test_failed_delete_keeps_rows_and_cache() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        let mut app = loaded(&source);
        source.set_fail_deletes(true);
        let selects_before = source.select_count();

        app.handle_key(key(KeyCode::Delete));
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app);

        assert_eq!(app.leads().len(), 3);
        assert_eq!(source.len(), 3);
        // No invalidation, so no refetch
        assert_eq!(source.select_count(), selects_before);
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.starts_with("Delete failed"));
    }

    #[test]
    fn test_delete_of_missing_row_still_invalidates() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        let mut app = loaded(&source);
        app.handle_key(key(KeyCode::Char('d')));

        // Row vanishes before the confirmation lands
        delete_behind_app(&source, 1);

        app.handle_key(key(KeyCode::Char('y')));
        settle(&mut app);
        assert_eq!(app.notice.as_ref().map(|n| n.text.as_str()), Some("Lead was already gone"));
        assert_eq!(app.leads().len(), 2);
    }

    /// Delete straight through the source on a throwaway runtime.
    fn delete_behind_app(source: &Arc<MemorySource>, id: LeadId) {
        use leadboard_core::LeadSource;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(source.delete(id)).unwrap();
    }
}
