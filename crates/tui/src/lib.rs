pub mod app;
pub mod async_ops;
pub mod config;
pub mod table;
mod theme;
mod ui;
mod views;

use anyhow::Result;
use app::App;
use async_ops::AsyncCommand;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Mutex;
use std::time::Duration;

/// Log to a file under the config dir. stderr belongs to the terminal UI.
pub fn init_logging() -> Result<()> {
    let dir = config::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("ledgerchat.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LEDGERCHAT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Launch the TUI.
pub fn run() -> Result<()> {
    let config = config::load();
    let mut app = App::new(config);

    // Initial fetches, drained one per tick by the event loop.
    app.commands.push_back(AsyncCommand::CheckHealth);
    app.commands.push_back(AsyncCommand::FetchSuggestions);
    app.commands.push_back(AsyncCommand::FetchSessions);

    // Terminal setup
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    loop {
        app.expire_flash();
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(cmd) = app.commands.pop_front() {
            let result = rt.block_on(async_ops::execute(cmd, &app.config));
            app.apply_command_result(result);
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_key(key) {
                    break;
                }
            }
        }
    }
    Ok(())
}
