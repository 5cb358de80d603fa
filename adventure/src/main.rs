//! Choose-your-path adventure TUI.
//!
//! A terminal front-end for an AI-narrated story: pick a length, read each
//! chapter and choose what happens next until the story concludes.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripts:
//!
//! ```bash
//! printf '5\n1\n2\n' | cargo run -p adventure -- --headless
//! ```

mod app;
mod config;
mod events;
mod ui;

use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use adventure_core::{headless, Advance, ChapterLimit, Controller, RestartMode, StoryClient, StoryService};
use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::{App, PendingAction};
use config::{parse_restart_mode, Settings, CONFIG_FILE};
use events::{handle_event, EventResult};
use ui::render::render;

#[derive(Parser, Debug)]
#[command(name = "adventure", version, about = "AI-narrated choose-your-path adventure")]
struct Args {
    /// Story Service base URL
    #[arg(long)]
    service_url: Option<String>,

    /// Chapter limit (3-50)
    #[arg(long)]
    chapters: Option<u32>,

    /// What restart does: `setup` or `immediate`
    #[arg(long, value_parser = parse_restart_mode)]
    restart_mode: Option<RestartMode>,

    /// Ask the service to release the old session on restart
    #[arg(long)]
    release_on_restart: bool,

    /// Settings file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log file used while the TUI owns the terminal
    #[arg(long, default_value = "adventure.log")]
    log_file: PathBuf,

    /// Run the line-oriented protocol on stdin/stdout instead of the TUI
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args)?;

    let settings = resolve_settings(&args)?;
    info!(service = %settings.service_url, chapters = %settings.chapters, "starting");

    let client = StoryClient::new(&settings.service_url)?;
    let mut controller = Controller::new(client, settings.controller_config());

    if args.headless {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        headless::run(&mut controller, stdin.lock(), &mut stdout).await?;
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, App::new(controller)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        warn!(error = %e, "terminal loop failed");
    }
    result?;
    Ok(())
}

/// Logs go to stderr in headless mode and to `--log-file` otherwise.
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        let file = File::create(&args.log_file)
            .with_context(|| format!("failed to create log file '{}'", args.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn resolve_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(&args.config)?;

    if let Some(url) = &args.service_url {
        settings.service_url = url.clone();
    }
    if let Some(chapters) = args.chapters {
        settings.chapters = ChapterLimit::new(chapters).context("invalid --chapters")?;
    }
    if let Some(mode) = args.restart_mode {
        settings.restart_mode = mode;
    }
    if args.release_on_restart {
        settings.release_on_restart = true;
    }
    Ok(settings)
}

async fn run_app<B, S>(terminal: &mut Terminal<B>, mut app: App<S>) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    S: StoryService + 'static,
{
    loop {
        app.controller.apply_pending_summaries();

        // Render
        terminal.draw(|f| render(f, &app))?;

        // Run any queued controller work. Input is not read until it settles.
        if let Some(action) = app.pending.take() {
            run_action(terminal, &mut app, action).await?;
            continue;
        }

        // Poll for events with timeout for animations
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if handle_event(&mut app, ev) == EventResult::Quit {
                return Ok(());
            }
        } else {
            // Tick animations
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

async fn run_action<B, S>(terminal: &mut Terminal<B>, app: &mut App<S>, action: PendingAction) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    S: StoryService + 'static,
{
    match action {
        PendingAction::Start => {
            let Ok(pending) = app.controller.begin_start() else {
                return Ok(());
            };
            // Show the loading state before awaiting
            terminal.draw(|f| render(f, app))?;
            if app.controller.complete_start(pending).await == Advance::Playing {
                app.on_new_chapter();
            }
        }
        PendingAction::Choice(index) => {
            let Ok(pending) = app.controller.begin_choice(index) else {
                return Ok(());
            };
            terminal.draw(|f| render(f, app))?;

            match app.controller.complete_choice(pending).await {
                Advance::Playing => app.on_new_chapter(),
                Advance::Concluding => {
                    app.on_new_chapter();
                    terminal.draw(|f| render(f, app))?;
                    if let Err(e) = app.controller.conclude().await {
                        warn!(error = %e, "could not conclude");
                    }
                }
                _ => {}
            }
        }
        PendingAction::Restart => {
            if app.controller.config().restart_mode == RestartMode::Immediate {
                app.controller.reset();
                app.on_restart();
                app.pending = Some(PendingAction::Start);
            } else {
                match app.controller.restart().await {
                    Ok(_) => app.on_restart(),
                    Err(e) => warn!(error = %e, "restart failed"),
                }
            }
        }
    }
    Ok(())
}
