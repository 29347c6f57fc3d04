use super::*;

use leadboard_core::format::format_day_label;
use leadboard_core::{DailyLeadCount, TagCount};
use ratatui::{
    layout::Direction,
    symbols,
    widgets::{BarChart, Sparkline},
};

/// Horizontal bars for the most frequent tags.
pub fn render_tag_chart(frame: &mut Frame, tags: Option<&[TagCount]>, area: Rect) {
    const TITLE: &str = "Leads by tag";
    let Some(tags) = tags else {
        render_unavailable(frame, TITLE, area);
        return;
    };
    if tags.is_empty() {
        let empty = Paragraph::new("No leads")
            .style(Style::default().fg(DIM))
            .block(panel(TITLE));
        frame.render_widget(empty, area);
        return;
    }

    let data: Vec<(&str, u64)> = tags
        .iter()
        .map(|t| (t.tag.as_str(), t.count as u64))
        .collect();
    let chart = BarChart::default()
        .block(panel(TITLE))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(ACCENT))
        .value_style(Style::default().fg(Color::Black).bg(ACCENT))
        .label_style(Style::default().fg(TEXT))
        .data(data.as_slice());
    frame.render_widget(chart, area);
}

/// Daily lead counts as a sparkline with its first and last day underneath.
pub fn render_daily_chart(
    frame: &mut Frame,
    days: Option<&[DailyLeadCount]>,
    history_days: u32,
    area: Rect,
) {
    let Some(days) = days else {
        render_unavailable(frame, "Leads per day", area);
        return;
    };

    let title = match (days.first(), days.last()) {
        (Some(first), Some(last)) => format!(
            "Leads per day · {} – {}",
            format_day_label(first.date),
            format_day_label(last.date)
        ),
        _ => format!("Leads per day · last {} days", history_days),
    };
    let block = panel(&title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Peak
        Constraint::Min(2),    // Sparkline
        Constraint::Length(1), // Day labels
    ])
    .split(inner);

    let values: Vec<u64> = days.iter().map(|d| d.count as u64).collect();
    let peak = values.iter().copied().max().unwrap_or(0);
    let total: u64 = values.iter().sum();
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} total", total), Style::default().fg(TEXT)),
            Span::styled(format!("  peak {}", peak), Style::default().fg(DIM)),
        ])),
        chunks[0],
    );

    let sparkline = Sparkline::default()
        .data(&values)
        .style(Style::default().fg(ACCENT))
        .bar_set(symbols::bar::NINE_LEVELS);
    frame.render_widget(sparkline, chunks[1]);

    if let (Some(first), Some(last)) = (days.first(), days.last()) {
        let left = format_day_label(first.date);
        let right = format_day_label(last.date);
        // One column per day, so the last label ends under the last bar
        let span = (values.len() as u16).min(chunks[2].width) as usize;
        let gap = span.saturating_sub(left.len() + right.len());
        let labels = if gap > 0 {
            format!("{}{}{}", left, " ".repeat(gap), right)
        } else {
            left
        };
        frame.render_widget(
            Paragraph::new(Span::styled(labels, Style::default().fg(DIM))),
            chunks[2],
        );
    }
}
