//! The `run` command: full discovery, scan and report.

use console::style;

use voxboard::config::{load_game_modes, Settings};
use voxboard::discovery::read_seed_file;
use voxboard::report::{ReportComposer, ReportSink, TextFileSink};
use voxboard::run::LeaderboardRun;

use super::progress::ScanProgress;

pub async fn cmd_run(settings: &Settings) -> anyhow::Result<()> {
    // Input errors surface before any request is made.
    let seeds = read_seed_file(&settings.seeds_path).await?;
    let modes = load_game_modes(&settings.gamemodes_path).await?;

    let client = settings.api_client()?;
    let run = LeaderboardRun::new(client, settings.run_options());

    println!(
        "{} Discovering players ({} seeds, {} game modes)",
        style("→").cyan(),
        seeds.len(),
        modes.len()
    );

    let progress = ScanProgress::new();
    let outcome = run.execute(&seeds, &modes, &progress).await;
    progress.finish();

    let sink = TextFileSink::new(
        settings.output_path.clone(),
        ReportComposer::new(&settings.report_title),
    );
    sink.publish(&outcome.leaderboards, &outcome.metrics).await?;

    let (hours, minutes, seconds) = outcome.metrics.elapsed_hms();
    println!(
        "{} Scanned {} players with {} requests in {}h {}m {}s",
        style("✓").green(),
        outcome.metrics.players_scanned,
        outcome.metrics.total_requests,
        hours,
        minutes,
        seconds
    );

    let failed = run.client().failed_count();
    if failed > 0 {
        println!(
            "  {} {} requests came back empty",
            style("!").yellow(),
            failed
        );
    }

    println!(
        "{} Report written to {}",
        style("✓").green(),
        sink.path().display()
    );

    Ok(())
}
