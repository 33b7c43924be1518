//! Parley Entry Point
//!
//! Usage:
//!   parley [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>     Config file (default: ~/.config/parley/config.toml)
//!       --db <PATH>         Conversation database
//!   -b, --backend <NAME>    ollama, gemini or mock
//!   -m, --model <MODEL>     Model name for the backend
//!       --theme <NAME>      Highlighting theme
//!       --ephemeral         Keep conversations in memory only
//!       --plain             No syntax highlighting
//!       --list-themes       Print the available themes and exit

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use parley_core::config::{default_config_path, load_config_from_path};
use parley_core::{logging, BackendKind, ConfigOverrides, HighlightRenderer};
use parley_tui::{build_orchestrator, App};

/// Parley - multi-conversation chat in the terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "PARLEY_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Conversation database path
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Assistant backend (ollama, gemini, mock)
    #[arg(short = 'b', long, value_name = "NAME")]
    backend: Option<BackendKind>,

    /// Model name for the backend
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Highlighting theme
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Keep conversations in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Render messages without highlighting
    #[arg(long)]
    plain: bool,

    /// Print the available themes and exit
    #[arg(long)]
    list_themes: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new()
            .with_ephemeral(self.ephemeral)
            .with_plain(self.plain);
        if let Some(ref path) = self.db {
            overrides = overrides.with_db_path(path.clone());
        }
        if let Some(backend) = self.backend {
            overrides = overrides.with_backend(backend);
        }
        if let Some(ref model) = self.model {
            overrides = overrides.with_model(model.clone());
        }
        if let Some(ref theme) = self.theme {
            overrides = overrides.with_theme(theme.clone());
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list_themes {
        let mut themes = HighlightRenderer::available_themes();
        themes.sort();
        for theme in themes {
            println!("{theme}");
        }
        return Ok(());
    }

    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))
        .context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // The terminal belongs to the UI, so logs go to a file
    logging::init(&config.logging).context("Failed to set up logging")?;
    tracing::info!(
        source = %config.source(),
        db = %config.db_path.display(),
        "Starting parley"
    );

    let orchestrator = Arc::new(build_orchestrator(&config)?);

    // Reachability is only reported; the first talk surfaces real failures
    {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            if orchestrator.check_assistant().await {
                tracing::info!(assistant = orchestrator.assistant_name(), "Assistant reachable");
            }
        });
    }

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: parley requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or ssh ran without -t.");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, orchestrator).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "parley exited with an error");
    } else {
        tracing::info!("parley exited");
    }
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    orchestrator: Arc<parley_core::SessionOrchestrator>,
) -> anyhow::Result<()> {
    let mut app = App::new(orchestrator).context("Failed to load conversations")?;
    app.run(terminal).await
}
