//! Lawn Defense - unified CLI
//!
//! Terminal game, leaderboard server and database maintenance.

#![warn(missing_docs)]

mod cli;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use lawn_defense::{
    GameController, GameSettings, LeaderboardApi, LeaderboardClient, LevelConfig, ServerConfig,
    run_cleanup, serve,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            settings,
            server_url,
            offline,
            log_file,
        } => run_play(settings, server_url, offline, log_file).await,
        Command::Serve {
            host,
            port,
            db_path,
        } => run_server(host, port, db_path).await,
        Command::Dedup { db_path } => run_dedup(&db_path),
    }
}

/// Console logging for the server and maintenance commands.
fn init_console_tracing(debug: bool) {
    let default = if debug {
        "info,lawn_defense=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

/// Run the leaderboard HTTP server
async fn run_server(host: Option<String>, port: Option<u16>, db_path: Option<String>) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(db_path) = db_path {
        config = config.with_database_path(db_path);
    }

    init_console_tracing(*config.debug());
    info!(addr = %config.bind_address(), "Starting leaderboard server");
    info!("Open http://{}/ for the leaderboard page", config.bind_address());
    serve(config).await
}

/// Run the duplicate-player cleanup and print its report
fn run_dedup(db_path: &Path) -> Result<()> {
    init_console_tracing(false);
    let report = run_cleanup(db_path)?;
    println!("{}", report);
    Ok(())
}

/// Run the terminal game
#[instrument(skip_all, fields(settings = %settings_path.display()))]
async fn run_play(
    settings_path: PathBuf,
    server_url: Option<String>,
    offline: bool,
    log_file: PathBuf,
) -> Result<()> {
    // Setup logging to file to avoid interfering with the TUI
    let log = std::fs::File::create(&log_file)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log))
        .with_ansi(false)
        .try_init();

    info!("Starting Lawn Defense");

    let mut settings = GameSettings::load_or_default(&settings_path)?;
    if server_url.is_some() {
        settings = settings.with_server_url(server_url);
    }

    let level_config = match settings.level() {
        Some(path) => LevelConfig::from_file(path)?,
        None => LevelConfig::front_lawn(),
    };

    let api: Option<Arc<dyn LeaderboardApi>> = match settings.server_url() {
        Some(url) if !offline => match LeaderboardClient::new(url.clone()) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn LeaderboardApi>),
            Err(e) => {
                warn!(error = %e, "Leaderboard client unavailable, playing offline");
                None
            }
        },
        _ => None,
    };

    let mut controller = GameController::new(settings, level_config, api);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = controller.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = ?err, "Game loop error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
