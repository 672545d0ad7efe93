//! The `discover` command: population discovery only.

use std::path::Path;

use console::style;

use voxboard::config::Settings;
use voxboard::discovery::read_seed_file;
use voxboard::run::LeaderboardRun;

pub async fn cmd_discover(settings: &Settings, write: Option<&Path>) -> anyhow::Result<()> {
    let seeds = read_seed_file(&settings.seeds_path).await?;

    let run = LeaderboardRun::new(settings.api_client()?, settings.run_options());
    let population = run.discover(&seeds).await;
    let stats = population.stats();

    if population.is_empty() {
        println!(
            "{} No players found; check the seed file and API key",
            style("!").yellow()
        );
    }

    println!(
        "{} Discovered {} players",
        style("✓").green(),
        style(stats.total).bold()
    );
    println!("  Seeds:              {}", stats.seeds);
    println!("  Leaderboards:       {}", stats.leaderboard);
    println!(
        "  Guild members:      {} (from {} guilds)",
        stats.guild_members, stats.guilds
    );
    println!("  Requests:           {}", run.client().request_count());

    if let Some(path) = write {
        let mut contents = population.to_vec().join("\n");
        contents.push('\n');
        tokio::fs::write(path, contents).await?;
        println!(
            "{} Wrote identifiers to {}",
            style("✓").green(),
            path.display()
        );
    }

    Ok(())
}
