//! Formatting helpers shared across UIs.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Format a BRL amount in short form (e.g. "R$ 41.9M", "R$ 750K").
pub fn format_currency_short(amount: u64) -> String {
    if amount >= 1_000_000 {
        format!("R$ {:.1}M", amount as f64 / 1_000_000.0)
    } else if amount >= 1_000 {
        format!("R$ {:.0}K", amount as f64 / 1_000.0)
    } else {
        format!("R$ {}", amount)
    }
}

/// Format a capture timestamp in local time as `dd/mm/yyyy HH:MM`.
pub fn format_lead_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

/// Format an optional capture timestamp, or a dash if missing.
pub fn format_lead_time_opt(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => format_lead_time(ts),
        None => "—".to_string(),
    }
}

/// Short axis label for a day (`dd/mm`).
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Full date as typed in the filter prompts (`dd/mm/yyyy`).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
