use super::*;

use leadboard_core::{StatusPeriod, StatusSlice};

/// Status shares for the selected period, one colored bar per status.
pub fn render_status_breakdown(
    frame: &mut Frame,
    statuses: Option<&[StatusSlice]>,
    period: StatusPeriod,
    area: Rect,
) {
    let Some(statuses) = statuses else {
        render_unavailable(frame, &format!("Status · {}", period.label()), area);
        return;
    };
    let total: usize = statuses.iter().map(|s| s.count).sum();
    let block = panel(&format!("Status · {} · {} total", period.label(), total));
    let inner = block.inner(area);

    if statuses.is_empty() {
        let empty = Paragraph::new("No leads")
            .style(Style::default().fg(DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let name_width = statuses
        .iter()
        .map(|s| s.status.chars().count())
        .max()
        .unwrap_or(0)
        .min(14);
    // Room left for the bar after "● name " and " 100% (9999)"
    let bar_width = (inner.width as usize).saturating_sub(name_width + 3 + 12);

    let lines: Vec<Line> = statuses
        .iter()
        .map(|slice| status_line(slice, name_width, bar_width))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn status_line(slice: &StatusSlice, name_width: usize, bar_width: usize) -> Line<'static> {
    let color = rgb(slice.color);
    let name: String = slice.status.chars().take(name_width).collect();
    let filled = (bar_width * slice.percentage as usize).div_ceil(100);
    let filled = if slice.count > 0 { filled.max(1) } else { 0 };

    Line::from(vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(
            format!("{:<width$} ", name, width = name_width),
            Style::default().fg(TEXT),
        ),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled(
            "░".repeat(bar_width.saturating_sub(filled)),
            Style::default().fg(BORDER_CARD),
        ),
        Span::styled(
            format!(" {}% ({})", slice.percentage, slice.count),
            Style::default().fg(DIM),
        ),
    ])
}
