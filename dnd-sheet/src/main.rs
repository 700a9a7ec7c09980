//! D&D character sheet TUI.
//!
//! Browse a character's skills, saves and attacks and roll them with an
//! animated dice window.
//!
//! ```bash
//! cargo run -p dnd-sheet -- "Brom"          # Open a stored character
//! cargo run -p dnd-sheet -- --new "Mira"    # Create a starter character
//! cargo run -p dnd-sheet -- --list          # List stored characters
//! ```

mod app;
mod config;
mod events;
mod logging;
mod scheduler;
mod ui;

use std::io::{self, stdout};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dnd_sheet_core::{Character, CharacterStore, StoreError};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use app::App;
use config::SheetConfig;
use events::{handle_event, EventResult};
use ui::render::render;

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    List,
    New(String),
    Open(Option<String>),
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut iter = args.iter().skip(1);
    let mut name = None;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--list" => return Ok(Command::List),
            "--new" => match iter.next() {
                Some(name) => return Ok(Command::New(name.clone())),
                None => bail!("--new requires a character name"),
            },
            other if other.starts_with('-') => bail!("unknown option {other}"),
            other => name = Some(other.to_string()),
        }
    }

    Ok(Command::Open(name))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        print_help();
        return Ok(());
    }

    let config = SheetConfig::from_env();
    let _log_guard = logging::setup_logging(&config.log_dir)?;
    let store = CharacterStore::new(&config.data_dir);

    let character = match command {
        Command::Help => return Ok(()),
        Command::List => {
            let summaries = store.list().await?;
            if summaries.is_empty() {
                println!("No characters in {}", store.dir().display());
            }
            for summary in summaries {
                println!(
                    "{:<24} Level {} {}",
                    summary.name, summary.level, summary.class_name
                );
            }
            return Ok(());
        }
        Command::New(name) => {
            let character = Character::sample_fighter(name);
            let path = store.save(&character).await?;
            println!("Created {}", path.display());
            character
        }
        Command::Open(Some(name)) => match store.load_by_name(&name).await {
            Ok(character) => character,
            Err(StoreError::NotFound(_)) => {
                bail!("no character named {name:?}; create one with --new {name:?}")
            }
            Err(e) => return Err(e).with_context(|| format!("loading {name:?}")),
        },
        Command::Open(None) => Character::sample_fighter("Adventurer"),
    };

    info!(name = %character.name, "opening character sheet");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(character, store, config.engine.clone());
    let result = run_app(&mut terminal, app, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "sheet exited with an error");
    }
    result.map_err(Into::into)
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    config: &SheetConfig,
) -> io::Result<()> {
    loop {
        // Render
        terminal.draw(|f| render(f, &app))?;

        // Process any pending save operation
        if app.pending_save {
            app.pending_save = false;
            match app.store.save(&app.character).await {
                Ok(path) => app.set_status(format!("Saved to {}", path.display())),
                Err(e) => {
                    error!(error = %e, "save failed");
                    app.set_status(format!("Save failed: {e}"));
                }
            }
            continue;
        }

        // Wait for input, but never past the next animation tick
        let timeout = app
            .scheduler
            .poll_timeout(Instant::now(), config.poll_interval);
        if event::poll(timeout)? {
            let ev = event::read()?;
            if handle_event(&mut app, ev, Instant::now()) == EventResult::Quit {
                return Ok(());
            }
        }

        app.fire_due_ticks(Instant::now());
    }
}

fn print_help() {
    println!("dnd-sheet - D&D 5e character sheet with animated dice");
    println!();
    println!("USAGE:");
    println!("  dnd-sheet [OPTIONS] [CHARACTER]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help       Show this help message");
    println!("  --list           List stored characters");
    println!("  --new <NAME>     Create a starter fighter and open it");
    println!();
    println!("ENVIRONMENT:");
    println!("  DND_SHEET_DATA_DIR       Character directory (default: ./characters)");
    println!("  DND_SHEET_LOG_DIR        Log directory");
    println!("  DND_SHEET_TICK_BASE_MS   Delay before the first animation frame");
    println!("  DND_SHEET_TICK_STEP_MS   Extra delay per animation frame");
    println!("  DND_SHEET_SEED           Fixed seed for reproducible rolls");
    println!("  DND_SHEET_POLL_MS        Input poll interval");
    println!("  RUST_LOG                 Log filter (default: info)");
}
