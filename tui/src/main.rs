use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use todo_core::{TodoClient, TodoStore};
use tracing::info;

mod app;
mod config;
mod logging;
mod transport;
mod ui;

#[cfg(test)]
mod testing;

use app::App;
use config::Config;
use transport::UreqTransport;

const STATUS_MAX_AGE: Duration = Duration::from_secs(4);

fn main() -> Result<()> {
    if !IsTty::is_tty(&io::stdout()) {
        eprintln!("This application requires a TTY terminal to run.");
        return Ok(());
    }

    let config = Config::load().context("loading configuration")?;
    logging::init(&config.log_path())?;

    let client = TodoClient::new(&config.base_url);
    let store = TodoStore::new(client, UreqTransport::new(config.timeout()))
        .with_sync_mode(config.sync_mode);
    info!(
        base_url = store.client().base_url(),
        sync_mode = ?store.sync_mode(),
        "starting"
    );
    let mut app = App::new(store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<UreqTransport>,
) -> Result<()> {
    // Paint the loading state before the first request blocks
    terminal.draw(|f| ui::draw(f, app))?;
    app.reload();

    while !app.should_quit {
        app.update_status_message(STATUS_MAX_AGE);
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }

    info!("exiting");
    Ok(())
}
