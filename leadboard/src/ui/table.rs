use super::*;

use leadboard_core::format::format_lead_time_opt;
use leadboard_core::Lead;
use ratatui::widgets::{Cell, Row, Table, TableState};

const MISSING: &str = "—";

fn or_missing(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

/// Render the filtered leads, newest first.
pub fn render_leads_table(
    frame: &mut Frame,
    leads: Option<&[Lead]>,
    state: &mut TableState,
    area: Rect,
) {
    const TITLE: &str = "Leads";
    let Some(leads) = leads else {
        render_unavailable(frame, TITLE, area);
        return;
    };
    if leads.is_empty() {
        let empty = Paragraph::new("No leads match the filters")
            .style(Style::default().fg(DIM))
            .alignment(Alignment::Center)
            .block(panel(TITLE));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        "Name",
        "Email",
        "Phone",
        "Potential",
        "Expertise",
        "Tag",
        "Date",
    ])
    .style(Style::default().fg(Color::Yellow).bold())
    .height(1);

    let rows: Vec<Row> = leads
        .iter()
        .enumerate()
        .map(|(i, lead)| {
            let row = Row::new(vec![
                Cell::from(or_missing(lead.name.as_deref())),
                Cell::from(or_missing(lead.email.as_deref())),
                Cell::from(or_missing(lead.phone.as_deref())),
                Cell::from(or_missing(lead.potential.as_deref()))
                    .style(Style::default().fg(ACCENT)),
                Cell::from(or_missing(lead.expertise.as_deref())),
                Cell::from(or_missing(lead.tag.as_deref())),
                Cell::from(format_lead_time_opt(lead.created_at))
                    .style(Style::default().fg(DIM)),
            ]);
            if i % 2 == 1 {
                row.style(Style::default().bg(ROW_ALT))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Percentage(17),
        Constraint::Percentage(20),
        Constraint::Percentage(13),
        Constraint::Length(10),
        Constraint::Percentage(12),
        Constraint::Percentage(14),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(&format!("{} │ {}", TITLE, leads.len())))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, state);
}
