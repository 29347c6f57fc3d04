//! leadboard-report - Print the dashboard aggregates for a filter
//!
//! Non-interactive rendition of the dashboard, as text, markdown or JSON.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use leadboard_core::calendar::parse_date;
use leadboard_core::dashboard::{DashboardQueries, DashboardSnapshot};
use leadboard_core::format::{format_currency_short, format_date, format_day_label};
use leadboard_core::{source, Config, LeadFilter, StatusPeriod};

#[derive(Parser, Debug)]
#[command(name = "leadboard-report")]
#[command(about = "Print lead dashboard aggregates")]
#[command(version)]
struct Args {
    /// Only leads with this tag ("all" disables the filter)
    #[arg(short, long)]
    tag: Option<String>,

    /// First day included (dd/mm/yyyy or yyyy-mm-dd)
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Last day included (dd/mm/yyyy or yyyy-mm-dd)
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,

    /// Status breakdown period: all, week, month or year
    #[arg(short, long, default_value = "all", value_parser = parse_period_arg)]
    period: StatusPeriod,

    /// Output format: text (default), md or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn parse_period_arg(value: &str) -> std::result::Result<StatusPeriod, String> {
    match value {
        "all" => Ok(StatusPeriod::All),
        "week" => Ok(StatusPeriod::Week),
        "month" => Ok(StatusPeriod::Month),
        "year" => Ok(StatusPeriod::Year),
        other => Err(format!("unknown period '{}'", other)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !matches!(args.format.as_str(), "text" | "md" | "json") {
        anyhow::bail!("Unknown format: {}. Use 'text', 'md' or 'json'", args.format);
    }
    let filter = LeadFilter {
        tag: args.tag.clone(),
        start_date: args.from,
        end_date: args.to,
    };
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if start > end {
            anyhow::bail!("--from ({}) is after --to ({})", format_date(start), format_date(end));
        }
    }

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = leadboard_core::logging::init(&config.logging).ok();

    let lead_source = source::open_source(&config.source).context("failed to open lead source")?;
    tracing::info!(source = %lead_source.describe(), ?filter, "Generating report");
    let queries = DashboardQueries::new(lead_source, &config.dashboard);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let snapshot = runtime
        .block_on(queries.snapshot(&filter, args.period, Utc::now()))
        .context("failed to load dashboard")?;

    match args.format.as_str() {
        "json" => print_json(&filter, args.period, &snapshot)?,
        "md" => print_markdown(&filter, args.period, &snapshot),
        _ => print_text(&filter, args.period, &snapshot),
    }

    Ok(())
}

fn describe_filter(filter: &LeadFilter) -> String {
    let tag = filter.effective_tag().unwrap_or("all tags");
    let range = match (filter.start_date, filter.end_date) {
        (None, None) => "any date".to_string(),
        (start, end) => format!(
            "{} to {}",
            start.map(format_date).unwrap_or_else(|| "…".to_string()),
            end.map(format_date).unwrap_or_else(|| "today".to_string())
        ),
    };
    format!("{}, {}", tag, range)
}

fn print_text(filter: &LeadFilter, period: StatusPeriod, snapshot: &DashboardSnapshot) {
    println!("Leads report ({})", describe_filter(filter));
    println!("{}", "─".repeat(50));

    if let Some(stats) = &snapshot.stats {
        println!("  Total leads:      {}", stats.total_leads);
        println!(
            "  Best tag:         {} ({})",
            stats.best_tag.name, stats.best_tag.count
        );
        println!(
            "  Worst tag:        {} ({})",
            stats.worst_tag.name, stats.worst_tag.count
        );
        println!(
            "  Top expertise:    {} ({})",
            stats.top_expertise.name, stats.top_expertise.count
        );
        println!("  Leads per day:    {:.1}", stats.average_leads_per_day);
    }
    if let Some(potential) = snapshot.potential {
        println!("  Total potential:  {}", format_currency_short(potential));
    }
    if let Some(tag) = &snapshot.potential_tag {
        println!(
            "  Most potential:   {} ({} high-value leads)",
            tag.name, tag.count
        );
    }

    if let Some(tags) = &snapshot.tag_counts {
        println!();
        println!("Leads by tag");
        for tag in tags {
            println!("  {:<24} {:>6}", tag.tag, tag.count);
        }
    }

    if let Some(days) = &snapshot.daily_counts {
        println!();
        println!("Leads per day");
        for day in days.iter().filter(|d| d.count > 0) {
            println!("  {}  {:>6}", format_day_label(day.date), day.count);
        }
    }

    if let Some(statuses) = &snapshot.statuses {
        println!();
        println!("Status ({})", period.label());
        if statuses.is_empty() {
            println!("  No leads");
        }
        for slice in statuses {
            println!(
                "  {:<24} {:>3}% ({})",
                slice.status, slice.percentage, slice.count
            );
        }
    }
}

fn print_markdown(filter: &LeadFilter, period: StatusPeriod, snapshot: &DashboardSnapshot) {
    println!("# Leads report");
    println!();
    println!("_{}_", describe_filter(filter));
    println!();

    if let Some(stats) = &snapshot.stats {
        println!("| Metric | Value |");
        println!("|--------|-------|");
        println!("| Total leads | {} |", stats.total_leads);
        println!(
            "| Best tag | {} ({}) |",
            stats.best_tag.name, stats.best_tag.count
        );
        println!(
            "| Worst tag | {} ({}) |",
            stats.worst_tag.name, stats.worst_tag.count
        );
        println!(
            "| Top expertise | {} ({}) |",
            stats.top_expertise.name, stats.top_expertise.count
        );
        println!("| Leads per day | {:.1} |", stats.average_leads_per_day);
        if let Some(potential) = snapshot.potential {
            println!("| Total potential | {} |", format_currency_short(potential));
        }
        if let Some(tag) = &snapshot.potential_tag {
            println!("| Tag with most potential | {} ({}) |", tag.name, tag.count);
        }
        println!();
    }

    if let Some(tags) = &snapshot.tag_counts {
        println!("## Leads by tag");
        println!();
        for tag in tags {
            println!("- **{}**: {}", tag.tag, tag.count);
        }
        println!();
    }

    if let Some(statuses) = &snapshot.statuses {
        println!("## Status ({})", period.label());
        println!();
        for slice in statuses {
            println!("- {}: {}% ({})", slice.status, slice.percentage, slice.count);
        }
        println!();
    }
}

fn print_json(filter: &LeadFilter, period: StatusPeriod, snapshot: &DashboardSnapshot) -> Result<()> {
    let output = serde_json::json!({
        "filter": filter,
        "status_period": period,
        "dashboard": snapshot,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
