//! UI rendering for the TUI.
//!
//! Rendering never fetches or computes: every panel draws values the app
//! already holds. While a refresh is outstanding the whole body shows one
//! loading panel instead of a mix of old and new numbers.

mod cards;
mod charts;
mod status;
mod table;

use leadboard_core::format::format_date;
use leadboard_core::lookup::Rgb;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, NoticeKind};

// ========== Dashboard Palette ==========

/// Accent for highlighted values and bars
const ACCENT: Color = Color::Rgb(0, 220, 130);
/// Negative trends and errors
const NEGATIVE: Color = Color::Rgb(239, 68, 68);
/// Primary text
const TEXT: Color = Color::Rgb(250, 250, 250);
/// Secondary text
const DIM: Color = Color::Rgb(128, 128, 128);
/// Card borders
const BORDER_CARD: Color = Color::Rgb(60, 60, 60);
/// Shading for every other table row
const ROW_ALT: Color = Color::Rgb(28, 28, 28);
/// Key hint color
const KEY_HINT: Color = Color::Yellow;

/// Terminal color for a lookup-table color.
fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Rounded panel block with a title.
fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_CARD))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(TEXT).bold())
}

/// Placeholder inside a panel whose value never loaded.
fn render_unavailable(frame: &mut Frame, title: &str, area: Rect) {
    let placeholder = Paragraph::new("Unavailable")
        .style(Style::default().fg(DIM).italic())
        .block(panel(title));
    frame.render_widget(placeholder, area);
}

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Layout: header, filter bar, body, footer
    let chunks = Layout::vertical([
        Constraint::Length(2), // Header
        Constraint::Length(1), // Filter bar
        Constraint::Min(10),   // Body
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    render_filter_bar(frame, app, chunks[1]);
    if app.is_loading() {
        render_loading(frame, chunks[2]);
    } else {
        render_dashboard(frame, app, chunks[2]);
    }
    render_footer(frame, app, chunks[3]);

    if let InputMode::ConfirmDelete { label, .. } = &app.input_mode {
        render_delete_prompt(frame, label, area);
    }
}

/// Render the title line.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(" ▮ ", Style::default().fg(ACCENT)),
            Span::styled("Leads Dashboard", Style::default().fg(TEXT).bold()),
        ]),
        Line::from(Span::styled(
            format!(" Landing page performance · {}", app.source_label),
            Style::default().fg(DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the active filter.
fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let date = |d: Option<chrono::NaiveDate>, open: &str| {
        d.map(format_date).unwrap_or_else(|| open.to_string())
    };
    let range = if app.filter.start_date.is_none() && app.filter.end_date.is_none() {
        format!("last {} days", app.history_days)
    } else {
        format!(
            "{} → {}",
            date(app.filter.start_date, "…"),
            date(app.filter.end_date, "today")
        )
    };

    let line = Line::from(vec![
        Span::styled(" Period ", Style::default().fg(DIM)),
        Span::styled(range, Style::default().fg(TEXT)),
        Span::raw("   "),
        Span::styled("Tag ", Style::default().fg(DIM)),
        Span::styled(app.tag_label().to_string(), Style::default().fg(ACCENT)),
        Span::raw("   "),
        Span::styled("Status ", Style::default().fg(DIM)),
        Span::styled(app.status_period.label(), Style::default().fg(TEXT)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// One panel in place of the whole body while a refresh is outstanding.
fn render_loading(frame: &mut Frame, area: Rect) {
    let placeholder = Paragraph::new("Loading dashboard...")
        .style(Style::default().fg(DIM))
        .alignment(Alignment::Center)
        .block(panel("Dashboard"));
    frame.render_widget(placeholder, area);
}

/// Cards, charts and the leads table.
fn render_dashboard(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(4),  // Stat cards
        Constraint::Length(4),  // Insight cards
        Constraint::Length(12), // Charts
        Constraint::Min(5),     // Leads table
    ])
    .split(area);

    let snapshot = app.snapshot().cloned().unwrap_or_default();

    cards::render_stat_cards(
        frame,
        snapshot.stats.as_ref(),
        snapshot.potential,
        chunks[0],
    );
    cards::render_insight_cards(
        frame,
        snapshot.stats.as_ref(),
        snapshot.potential_tag.as_ref(),
        chunks[1],
    );

    let chart_chunks = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(35),
        Constraint::Percentage(30),
    ])
    .split(chunks[2]);
    charts::render_tag_chart(frame, snapshot.tag_counts.as_deref(), chart_chunks[0]);
    charts::render_daily_chart(
        frame,
        snapshot.daily_counts.as_deref(),
        app.history_days,
        chart_chunks[1],
    );
    status::render_status_breakdown(
        frame,
        snapshot.statuses.as_deref(),
        app.status_period,
        chart_chunks[2],
    );

    table::render_leads_table(
        frame,
        snapshot.leads.as_deref(),
        &mut app.table_state,
        chunks[3],
    );
}

/// Render the footer: a date prompt, a notice, or key hints.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.input_mode {
        InputMode::StartDate | InputMode::EndDate => {
            let which = if app.input_mode == InputMode::StartDate {
                "Start date"
            } else {
                "End date"
            };
            Line::from(vec![
                Span::styled(format!(" {} (dd/mm/yyyy): ", which), Style::default().fg(KEY_HINT)),
                Span::styled(format!("{}_", app.date_input), Style::default().fg(TEXT)),
                Span::styled(
                    "   Enter apply  Esc cancel  empty clears",
                    Style::default().fg(DIM),
                ),
            ])
        }
        _ => match &app.notice {
            Some(notice) => {
                let color = match notice.kind {
                    NoticeKind::Info => TEXT,
                    NoticeKind::Success => ACCENT,
                    NoticeKind::Error => NEGATIVE,
                };
                Line::from(Span::styled(
                    format!(" {}", notice.text),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
            }
            None => key_hints(app),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn key_hints(app: &App) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, action) in [
        ("s/e", "dates"),
        ("t", "tag"),
        ("c", "clear"),
        ("p", "status period"),
        ("d", "delete"),
        ("r", "refresh"),
        ("j/k", "navigate"),
        ("q", "quit"),
    ] {
        spans.push(Span::styled(format!(" {}", key), Style::default().fg(KEY_HINT)));
        spans.push(Span::raw(format!(" {} ", action)));
    }
    let count = app.leads().len();
    let selected = app.table_state.selected().map(|i| i + 1).unwrap_or(0);
    spans.push(Span::raw("│ "));
    spans.push(Span::styled(
        format!("{}/{} leads", selected, count),
        Style::default().fg(DIM),
    ));
    Line::from(spans)
}

/// Centered confirmation popup.
fn render_delete_prompt(frame: &mut Frame, label: &str, area: Rect) {
    let width = 50.min(area.width);
    let height = 5.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let text = vec![
        Line::from(vec![
            Span::raw("Delete lead "),
            Span::styled(label.to_string(), Style::default().fg(TEXT).bold()),
            Span::raw("?"),
        ]),
        Line::from(vec![
            Span::styled("y", Style::default().fg(KEY_HINT)),
            Span::raw(" confirm  "),
            Span::styled("n", Style::default().fg(KEY_HINT)),
            Span::raw(" cancel"),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(NEGATIVE))
        .title(" Confirm delete ");

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::tests::{key, sample_leads, settle, test_app};
    use crossterm::event::KeyCode;
    use leadboard_core::MemorySource;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::sync::Arc;

    /// Flatten a buffer into newline-separated rows.
    pub(crate) fn buffer_text(buffer: &Buffer) -> String {
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_loading_state_hides_panels() {
        let mut app = test_app(Arc::new(MemorySource::new(sample_leads())));
        app.request_refresh();
        let screen = draw(&mut app);
        assert!(screen.contains("Loading dashboard..."));
        assert!(!screen.contains("Total leads"));
        settle(&mut app);
    }

    #[test]
    fn test_loaded_dashboard() {
        let mut app = test_app(Arc::new(MemorySource::new(sample_leads())));
        app.request_refresh();
        settle(&mut app);

        let screen = draw(&mut app);
        assert!(screen.contains("Total leads"));
        assert!(screen.contains("R$ 925K"));
        assert!(screen.contains("BIO IGOR"));
        assert!(screen.contains("Lead 1"));
        assert!(screen.contains("last 30 days"));
        assert!(screen.contains("1/3 leads"));
    }

    #[test]
    fn test_unloaded_dashboard_shows_unavailable() {
        let source = Arc::new(MemorySource::new(sample_leads()));
        source.set_fail_selects(true);
        let mut app = test_app(source);
        app.request_refresh();
        settle(&mut app);

        let screen = draw(&mut app);
        assert!(screen.contains("Unavailable"));
        assert!(screen.contains("Failed to load"));
    }

    #[test]
    fn test_prompts_render() {
        let mut app = test_app(Arc::new(MemorySource::new(sample_leads())));
        app.request_refresh();
        settle(&mut app);

        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('0')));
        assert!(draw(&mut app).contains("Start date (dd/mm/yyyy): 0_"));
        app.handle_key(key(KeyCode::Esc));

        app.handle_key(key(KeyCode::Char('d')));
        let screen = draw(&mut app);
        assert!(screen.contains("Confirm delete"));
        assert!(screen.contains("Delete lead Lead 1?"));
    }
}
