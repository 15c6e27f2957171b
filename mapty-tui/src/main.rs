// mapty-tui/src/main.rs
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use mapty_lib::{AppService, ConfiguredLocation};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{fs::OpenOptions, io, time::Duration};

mod app; // Application state
mod ui; // UI rendering logic

use crate::app::App;

const LOG_FILE_NAME: &str = "mapty-tui.log";

fn main() -> Result<()> {
    init_logging()?;

    // Initialize the library service
    let mut app_service =
        AppService::initialize().context("Failed to initialize application service")?;
    // A failed fix is queued as a notice and shown once the UI is up
    let locator = ConfiguredLocation::from_config(&app_service.config);
    if let Ok(position) = app_service.locate_with(&locator) {
        info!("Starting at {position}");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run it
    let mut app = App::new(app_service);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("TUI exited with error: {err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// The terminal belongs to the UI, so log lines go to a file in the data directory.
fn init_logging() -> Result<()> {
    let log_path = mapty_lib::get_data_dir_util()
        .context("Failed to determine data directory")?
        .join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {log_path:?}"))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Pull camera moves and notices pushed by the service
        app.sync_view();

        terminal.draw(|f| ui::render_ui(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key)?;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
