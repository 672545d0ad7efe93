//! voxboard - per-gamemode win leaderboards built from the Voxyl statistics API.
//!
//! Core library: population discovery, rate-budgeted batch fetching,
//! stats aggregation, ranking and report rendering.

pub mod config;
pub mod discovery;
pub mod http_client;
pub mod models;
pub mod ranking;
pub mod report;
pub mod run;
pub mod scheduler;
pub mod stats;

pub use http_client::{ApiClient, Payload};
pub use models::{GameModeSpec, GuildTag, Identifier, PlayerRecord, RunMetrics};
pub use run::{LeaderboardRun, RunOutcome};
pub use scheduler::{BatchObserver, BatchScheduler};
