//! leadboard - Landing page leads dashboard
//!
//! Terminal UI for browsing, filtering and pruning captured leads.

mod app;
mod ui;

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use leadboard_core::dashboard::{DashboardQueries, DashboardWorker};
use leadboard_core::{source, Config};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        leadboard_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("leadboard TUI starting up");

    let lead_source = source::open_source(&config.source).context("failed to open lead source")?;
    let source_label = lead_source.describe();
    tracing::info!(source = %source_label, "Lead source ready");

    let queries = DashboardQueries::new(lead_source, &config.dashboard);
    let worker = DashboardWorker::spawn(queries).context("failed to start query worker")?;

    // Kick off the first load before the terminal takes over
    let mut app = App::new(worker, source_label, config.dashboard.history_days);
    app.request_refresh();

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("leadboard TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Apply whatever the worker finished
        app.poll_worker();
        app.tick();

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
