//! Domain models.

pub mod api;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque player key (UUID). Join and de-duplication key across all sources.
pub type Identifier = String;

/// Opaque guild key, only used to look up the guild's members.
pub type GuildTag = String;

/// One ranked game mode: how it is titled and which stats field it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameModeSpec {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "api_name")]
    pub field_key: String,
}

impl GameModeSpec {
    pub fn new(display_name: &str, field_key: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            field_key: field_key.to_string(),
        }
    }
}

/// Aggregated wins for one player. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    identifier: Identifier,
    display_name: String,
    wins: BTreeMap<String, u64>,
}

impl PlayerRecord {
    pub fn new(identifier: &str, display_name: &str, wins: BTreeMap<String, u64>) -> Self {
        Self {
            identifier: identifier.to_string(),
            display_name: display_name.to_string(),
            wins,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Resolved player name; empty if the identity lookup failed.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Wins for a stats field. Fields missing from the payload count as 0.
    pub fn wins(&self, field_key: &str) -> u64 {
        self.wins.get(field_key).copied().unwrap_or(0)
    }

    pub fn win_counts(&self) -> &BTreeMap<String, u64> {
        &self.wins
    }

    /// Name to show in output: the display name, or the raw identifier if none.
    pub fn display_key(&self) -> &str {
        if self.display_name.is_empty() {
            &self.identifier
        } else {
            &self.display_name
        }
    }
}

/// Whole-run accounting for the report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunMetrics {
    pub elapsed: Duration,
    pub total_requests: u64,
    pub players_scanned: usize,
}

impl RunMetrics {
    /// Elapsed time rounded to whole seconds, split into hours, minutes, seconds.
    pub fn elapsed_hms(&self) -> (u64, u64, u64) {
        let total = self.elapsed.as_secs_f64().round() as u64;
        (total / 3600, (total % 3600) / 60, total % 60)
    }
}
