use super::*;

use leadboard_core::format::format_currency_short;
use leadboard_core::{LeadStats, NamedCount};
use ratatui::{buffer::Buffer, widgets::Widget};

/// Headline number with a subtitle and optional trend.
pub struct StatCard<'a> {
    pub title: &'a str,
    pub value: String,
    pub subtitle: String,
    /// Percent change; positive renders as an up arrow
    pub trend: Option<i32>,
    pub highlight: bool,
}

impl<'a> StatCard<'a> {
    pub fn new(title: &'a str, value: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title,
            value: value.into(),
            subtitle: subtitle.into(),
            trend: None,
            highlight: false,
        }
    }

    pub fn trend(mut self, trend: Option<i32>) -> Self {
        self.trend = trend;
        self
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}

impl Widget for StatCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.highlight { ACCENT } else { BORDER_CARD };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(DIM));
        let inner = block.inner(area);
        block.render(area, buf);

        let value_color = if self.highlight { ACCENT } else { TEXT };
        let mut value_line = vec![Span::styled(
            self.value,
            Style::default().fg(value_color).bold(),
        )];
        if let Some(trend) = self.trend {
            let (arrow, color) = match trend {
                t if t > 0 => ("▲", ACCENT),
                t if t < 0 => ("▼", NEGATIVE),
                _ => ("•", DIM),
            };
            value_line.push(Span::raw("  "));
            value_line.push(Span::styled(
                format!("{} {}%", arrow, trend.abs()),
                Style::default().fg(color),
            ));
        }

        Paragraph::new(vec![
            Line::from(value_line),
            Line::from(Span::styled(self.subtitle, Style::default().fg(DIM))),
        ])
        .render(inner, buf);
    }
}

/// Secondary insight: a label value with context.
pub struct InsightCard<'a> {
    pub title: &'a str,
    pub value: String,
    pub subtitle: String,
    /// Value and subtitle share one line
    pub compact: bool,
}

impl<'a> InsightCard<'a> {
    pub fn new(title: &'a str, value: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title,
            value: value.into(),
            subtitle: subtitle.into(),
            compact: false,
        }
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

impl Widget for InsightCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_CARD))
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(DIM));
        let inner = block.inner(area);
        block.render(area, buf);

        let value = Span::styled(self.value, Style::default().fg(ACCENT).bold());
        let subtitle = Span::styled(self.subtitle, Style::default().fg(DIM));
        let lines = if self.compact {
            vec![Line::from(vec![value, Span::raw(" "), subtitle])]
        } else {
            vec![Line::from(value), Line::from(subtitle)]
        };
        Paragraph::new(lines).render(inner, buf);
    }
}

fn leads_subtitle(count: usize) -> String {
    match count {
        1 => "1 lead".to_string(),
        n => format!("{} leads", n),
    }
}

const UNAVAILABLE: &str = "—";

/// Total, best tag, potential and worst tag.
pub fn render_stat_cards(
    frame: &mut Frame,
    stats: Option<&LeadStats>,
    potential: Option<u64>,
    area: Rect,
) {
    let chunks = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);

    let cards = match stats {
        Some(stats) => [
            StatCard::new("Total leads", stats.total_leads.to_string(), "leads captured"),
            StatCard::new(
                "Best tag",
                stats.best_tag.name.clone(),
                leads_subtitle(stats.best_tag.count),
            )
            .highlight(true),
            StatCard::new(
                "Worst tag",
                stats.worst_tag.name.clone(),
                leads_subtitle(stats.worst_tag.count),
            ),
        ],
        None => [
            StatCard::new("Total leads", UNAVAILABLE, "unavailable"),
            StatCard::new("Best tag", UNAVAILABLE, "unavailable").highlight(true),
            StatCard::new("Worst tag", UNAVAILABLE, "unavailable"),
        ],
    };
    let potential_card = match potential {
        Some(amount) => StatCard::new(
            "Total potential",
            format_currency_short(amount),
            "estimated revenue",
        ),
        None => StatCard::new("Total potential", UNAVAILABLE, "unavailable"),
    };

    let [total, best, worst] = cards;
    frame.render_widget(total, chunks[0]);
    frame.render_widget(best, chunks[1]);
    frame.render_widget(potential_card, chunks[2]);
    frame.render_widget(worst, chunks[3]);
}

/// Top potential tag, top expertise and daily average.
pub fn render_insight_cards(
    frame: &mut Frame,
    stats: Option<&LeadStats>,
    potential_tag: Option<&NamedCount>,
    area: Rect,
) {
    let chunks = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);

    let potential = match potential_tag {
        Some(tag) => InsightCard::new(
            "Tag with most potential",
            tag.name.clone(),
            format!("{} high-value leads", tag.count),
        ),
        None => InsightCard::new("Tag with most potential", UNAVAILABLE, "unavailable"),
    };
    let (expertise, average) = match stats {
        Some(stats) => (
            InsightCard::new(
                "Top expertise",
                stats.top_expertise.name.clone(),
                leads_subtitle(stats.top_expertise.count),
            ),
            InsightCard::new(
                "Leads per day",
                format!("{:.1}", stats.average_leads_per_day),
                "daily average",
            ),
        ),
        None => (
            InsightCard::new("Top expertise", UNAVAILABLE, "unavailable"),
            InsightCard::new("Leads per day", UNAVAILABLE, "unavailable"),
        ),
    };

    frame.render_widget(potential, chunks[0]);
    frame.render_widget(expertise, chunks[1]);
    frame.render_widget(average.compact(true), chunks[2]);
}
