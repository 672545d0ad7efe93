//! Population discovery.
//!
//! The set of players to scan is the union of three overlapping sources:
//! a static seed list, the two global player leaderboards, and the rosters
//! of every guild on the top-guilds board. Union means de-duplication; an
//! identifier found in several places is scanned once.

mod seeds;

pub use seeds::{parse_seeds, read_seed_file, SeedError};

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::http_client::{ApiClient, Endpoint, LeaderboardMetric, LEADERBOARD_SIZE};
use crate::models::api::{GuildLeaderboardResponse, GuildMembersResponse, LeaderboardResponse};
use crate::models::{GuildTag, Identifier};
use crate::scheduler::{BatchObserver, BatchScheduler};

/// Per-source counts, before de-duplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    pub seeds: usize,
    pub leaderboard: usize,
    pub guilds: usize,
    pub guild_members: usize,
    /// Distinct identifiers after the union.
    pub total: usize,
}

/// The de-duplicated set of identifiers to scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Population {
    identifiers: BTreeSet<Identifier>,
    stats: DiscoveryStats,
}

impl Population {
    /// Identifiers in a stable order, ready for batching.
    pub fn to_vec(&self) -> Vec<Identifier> {
        self.identifiers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn stats(&self) -> DiscoveryStats {
        self.stats
    }
}

pub struct PopulationDiscoverer {
    client: ApiClient,
}

impl PopulationDiscoverer {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Entrants of the level board and the weighted-wins board.
    /// A board that fails to load contributes nothing.
    pub async fn discover_from_leaderboards(&self) -> BTreeSet<Identifier> {
        let mut identifiers = BTreeSet::new();

        for metric in [LeaderboardMetric::Level, LeaderboardMetric::WeightedWins] {
            let board: LeaderboardResponse = self
                .client
                .fetch(&Endpoint::Leaderboard {
                    metric,
                    count: LEADERBOARD_SIZE,
                })
                .await
                .parse_or_default();

            let before = identifiers.len();
            identifiers.extend(board.identifiers());
            debug!(
                "Leaderboard '{}' added {} new identifiers",
                metric.as_param(),
                identifiers.len() - before
            );
        }

        identifiers
    }

    /// Tags of the top guilds, in the order the API returns them.
    pub async fn discover_guild_tags(&self) -> Vec<GuildTag> {
        let board: GuildLeaderboardResponse = self
            .client
            .fetch(&Endpoint::GuildLeaderboard {
                count: LEADERBOARD_SIZE,
            })
            .await
            .parse_or_default();
        board.tags().collect()
    }

    pub async fn discover_guild_members(&self, tag: &str) -> BTreeSet<Identifier> {
        let roster: GuildMembersResponse = self
            .client
            .fetch(&Endpoint::GuildMembers { tag })
            .await
            .parse_or_default();
        roster.identifiers().collect()
    }

    /// Seeds, leaderboard entrants and all top-guild members, de-duplicated.
    ///
    /// Guild rosters are fetched through `scheduler`, so a guild board larger
    /// than one request window is spread across windows.
    pub async fn discover_population(
        &self,
        seeds: &[Identifier],
        scheduler: &BatchScheduler,
        observer: &dyn BatchObserver,
    ) -> Population {
        let mut identifiers: BTreeSet<Identifier> = seeds.iter().cloned().collect();
        let mut stats = DiscoveryStats {
            seeds: seeds.len(),
            ..DiscoveryStats::default()
        };

        let leaderboard = self.discover_from_leaderboards().await;
        stats.leaderboard = leaderboard.len();
        identifiers.extend(leaderboard);

        let tags = self.discover_guild_tags().await;
        stats.guilds = tags.len();
        info!("Fetching rosters for {} guilds", tags.len());

        let rosters = scheduler
            .run_batched(&tags, |tag| self.discover_guild_members(tag), observer)
            .await;
        for roster in rosters {
            stats.guild_members += roster.len();
            identifiers.extend(roster);
        }

        stats.total = identifiers.len();
        info!(
            "Discovered {} players ({} seeds, {} leaderboard, {} guild members across {} guilds)",
            stats.total, stats.seeds, stats.leaderboard, stats.guild_members, stats.guilds
        );

        Population { identifiers, stats }
    }
}
