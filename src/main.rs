//! voxboard - per-gamemode win leaderboards for Voxyl's Bedwars practice modes.
//!
//! Discovers a player population from seeds, global leaderboards and top
//! guilds, scans every player's stats within the API rate budget, and writes
//! a text leaderboard report.

mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "voxboard=info"
    } else {
        "voxboard=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
