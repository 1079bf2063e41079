//! Command-line interface for lawn_defense.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lawn_defense::DEFAULT_SETTINGS_FILE;

/// Lawn Defense - terminal tower defense with a local leaderboard
#[derive(Parser, Debug)]
#[command(name = "lawn_defense")]
#[command(about = "Terminal lawn-defense game and leaderboard server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play the game in the terminal
    Play {
        /// Settings file (TOML)
        #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
        settings: PathBuf,

        /// Leaderboard server URL, overrides the settings file
        #[arg(long, env = "LAWN_SERVER_URL")]
        server_url: Option<String>,

        /// Never contact the leaderboard server
        #[arg(long)]
        offline: bool,

        /// Log file (the terminal is owned by the game)
        #[arg(long, default_value = "lawn_defense.log")]
        log_file: PathBuf,
    },

    /// Run the leaderboard HTTP server
    Serve {
        /// Host to bind to, overrides LAWN_HOST
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to, overrides LAWN_PORT
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file, overrides DATABASE_PATH
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Remove duplicate player records and enforce unique employee ids
    Dedup {
        /// SQLite database file
        #[arg(long, env = "DATABASE_PATH", default_value = "game.db")]
        db_path: PathBuf,
    },
}
