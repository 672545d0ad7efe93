//! Command-line interface.
//!
//! Parses arguments, loads settings and dispatches to the command modules.

mod discover;
mod progress;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use voxboard::config::{load_settings_with_options, LoadOptions, Settings};

#[derive(Parser)]
#[command(name = "voxboard")]
#[command(about = "Per-gamemode win leaderboards from the Voxyl statistics API")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "VOXBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Discover players, scan their stats and write the leaderboard report
    Run {
        /// Seed identifier file (one UUID per line)
        #[arg(long)]
        seeds: Option<PathBuf>,
        /// Game mode list (JSON)
        #[arg(long)]
        gamemodes: Option<PathBuf>,
        /// Report output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Players listed per game mode
        #[arg(short, long)]
        top: Option<usize>,
        /// Requests allowed per rate window
        #[arg(long)]
        requests_per_minute: Option<usize>,
        /// Log upstream error responses
        #[arg(long, overrides_with = "no_output_errors")]
        output_errors: bool,
        /// Do not log upstream error responses
        #[arg(long, overrides_with = "output_errors")]
        no_output_errors: bool,
        /// Wait out the rate window after the final batch
        #[arg(long, overrides_with = "no_trailing_cooldown")]
        trailing_cooldown: bool,
        /// Stop right after the final batch
        #[arg(long, overrides_with = "trailing_cooldown")]
        no_trailing_cooldown: bool,
    },

    /// Discover the player population without scanning stats
    Discover {
        /// Seed identifier file (one UUID per line)
        #[arg(long)]
        seeds: Option<PathBuf>,
        /// Write the discovered identifiers to this file
        #[arg(short, long)]
        write: Option<PathBuf>,
    },
}

/// `--flag` / `--no-flag` pair as an override; neither given leaves the setting alone.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Flag overrides for `run`; `None` leaves the loaded setting alone.
#[derive(Debug, Default)]
struct RunOverrides {
    seeds: Option<PathBuf>,
    gamemodes: Option<PathBuf>,
    output: Option<PathBuf>,
    top: Option<usize>,
    requests_per_minute: Option<usize>,
    output_errors: Option<bool>,
    trailing_cooldown: Option<bool>,
}

impl RunOverrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(seeds) = self.seeds {
            settings.seeds_path = seeds;
        }
        if let Some(gamemodes) = self.gamemodes {
            settings.gamemodes_path = gamemodes;
        }
        if let Some(output) = self.output {
            settings.output_path = output;
        }
        if let Some(top) = self.top {
            settings.top_n = top;
        }
        if let Some(requests) = self.requests_per_minute {
            settings.requests_per_window = requests;
        }
        if let Some(output_errors) = self.output_errors {
            settings.output_errors = output_errors;
        }
        if let Some(trailing) = self.trailing_cooldown {
            settings.trailing_cooldown = trailing;
        }
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let mut settings = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Run {
            seeds,
            gamemodes,
            output,
            top,
            requests_per_minute,
            output_errors,
            no_output_errors,
            trailing_cooldown,
            no_trailing_cooldown,
        } => {
            RunOverrides {
                seeds,
                gamemodes,
                output,
                top,
                requests_per_minute,
                output_errors: switch(output_errors, no_output_errors),
                trailing_cooldown: switch(trailing_cooldown, no_trailing_cooldown),
            }
            .apply(&mut settings);
            settings.validate()?;
            run::cmd_run(&settings).await
        }
        Commands::Discover { seeds, write } => {
            if let Some(seeds) = seeds {
                settings.seeds_path = seeds;
            }
            settings.validate()?;
            discover::cmd_discover(&settings, write.as_deref()).await
        }
    }
}
