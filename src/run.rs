//! End-to-end leaderboard run: discover, collect, rank.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::discovery::{DiscoveryStats, Population, PopulationDiscoverer};
use crate::http_client::ApiClient;
use crate::models::{GameModeSpec, Identifier, RunMetrics};
use crate::ranking::{LeaderboardRanker, ModeLeaderboard};
use crate::scheduler::{BatchObserver, BatchScheduler, NoProgress};
use crate::stats::StatsAggregator;

/// Scheduling and ranking knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Requests allowed per window; also the batch size.
    pub batch_size: usize,
    /// Window length, waited out between batches.
    pub window: Duration,
    /// Wait out the window after the final stats batch too.
    pub trailing_cooldown: bool,
    pub top_n: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            batch_size: 400,
            window: Duration::from_secs(60),
            trailing_cooldown: false,
            top_n: 25,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub leaderboards: Vec<ModeLeaderboard>,
    pub metrics: RunMetrics,
    pub discovery: DiscoveryStats,
}

pub struct LeaderboardRun {
    client: ApiClient,
    options: RunOptions,
}

impl LeaderboardRun {
    pub fn new(client: ApiClient, options: RunOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Scheduler for the guild-roster phase.
    ///
    /// Always cools down after its last batch: the stats phase starts right
    /// after and would otherwise share a window with it.
    fn discovery_scheduler(&self) -> BatchScheduler {
        BatchScheduler::new(self.options.batch_size, self.options.window).with_trailing_cooldown(true)
    }

    fn stats_scheduler(&self) -> BatchScheduler {
        BatchScheduler::new(self.options.batch_size, self.options.window)
            .with_trailing_cooldown(self.options.trailing_cooldown)
    }

    /// Population discovery on its own, without collecting stats.
    pub async fn discover(&self, seeds: &[Identifier]) -> Population {
        // Nothing follows, so no trailing wait here.
        let scheduler = BatchScheduler::new(self.options.batch_size, self.options.window);
        PopulationDiscoverer::new(self.client.clone())
            .discover_population(seeds, &scheduler, &NoProgress)
            .await
    }

    /// Run the full pipeline. Never fails once started; fetch failures only
    /// thin out the data.
    ///
    /// `progress` is notified after each stats batch.
    pub async fn execute(
        &self,
        seeds: &[Identifier],
        modes: &[GameModeSpec],
        progress: &dyn BatchObserver,
    ) -> RunOutcome {
        let start = Instant::now();

        let population = PopulationDiscoverer::new(self.client.clone())
            .discover_population(seeds, &self.discovery_scheduler(), &NoProgress)
            .await;
        let identifiers = population.to_vec();

        let records = StatsAggregator::new(self.client.clone())
            .collect(&identifiers, &self.stats_scheduler(), progress)
            .await;

        let leaderboards = LeaderboardRanker::new(self.options.top_n).rank(&records, modes);

        let metrics = RunMetrics {
            elapsed: start.elapsed(),
            total_requests: self.client.request_count(),
            players_scanned: records.len(),
        };

        let failed = self.client.failed_count();
        if failed > 0 {
            warn!(
                "{} of {} requests failed; affected players have partial data",
                failed, metrics.total_requests
            );
        }
        info!(
            "Run finished: {} players, {} requests in {:?}",
            metrics.players_scanned, metrics.total_requests, metrics.elapsed
        );

        RunOutcome {
            leaderboards,
            metrics,
            discovery: population.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::mock::MockTransport;
    use std::sync::Arc;

    fn run_with(transport: MockTransport, top_n: usize) -> LeaderboardRun {
        let client = ApiClient::builder("key")
            .transport(Arc::new(transport))
            .build()
            .unwrap();
        LeaderboardRun::new(
            client,
            RunOptions {
                batch_size: 2,
                window: Duration::ZERO,
                trailing_cooldown: false,
                top_n,
            },
        )
    }

    #[tokio::test]
    async fn seeds_only_run_ranks_and_counts() {
        let transport = MockTransport::new()
            .route("/player/stats/game/a", 200, r#"{"stats":{"x":{"wins":5}}}"#)
            .route("/player/stats/game/b", 200, r#"{"stats":{"x":{"wins":10}}}"#)
            .route("/player/stats/game/c", 200, r#"{"stats":{}}"#)
            .route("/mojang/v2/user/b", 200, r#"{"username":"Bee"}"#);
        let run = run_with(transport, 2);
        let seeds: Vec<String> = ["a", "b", "c"].into_iter().map(String::from).collect();

        let outcome = run
            .execute(&seeds, &[GameModeSpec::new("X", "x")], &NoProgress)
            .await;

        let board: Vec<(&str, u64)> = outcome.leaderboards[0]
            .entries
            .iter()
            .map(|e| (e.display.as_str(), e.wins))
            .collect();
        assert_eq!(board, vec![("Bee", 10), ("a", 5)]);

        // 2 leaderboards + 1 guild board + 3 * (stats + identity)
        assert_eq!(outcome.metrics.total_requests, 9);
        assert_eq!(outcome.metrics.players_scanned, 3);
        assert_eq!(outcome.discovery.seeds, 3);
    }

    #[tokio::test]
    async fn empty_population_still_completes() {
        let run = run_with(MockTransport::new().fail("/"), 25);

        let outcome = run
            .execute(&[], &[GameModeSpec::new("X", "x")], &NoProgress)
            .await;

        assert_eq!(outcome.metrics.players_scanned, 0);
        assert_eq!(outcome.leaderboards.len(), 1);
        assert!(outcome.leaderboards[0].entries.is_empty());
        assert_eq!(outcome.metrics.total_requests, 3);
    }

    #[tokio::test]
    async fn discover_only_skips_stats() {
        let transport = MockTransport::new()
            .route("type=level", 200, r#"{"players":[{"uuid":"p1"}]}"#);
        let run = run_with(transport, 25);

        let population = run.discover(&["s".to_string()]).await;

        assert_eq!(population.len(), 2);
        assert_eq!(run.client().request_count(), 3);
    }
}
