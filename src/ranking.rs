//! Per-gamemode top-N ranking.

use crate::models::{GameModeSpec, PlayerRecord};

/// One line of a gamemode leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    /// 1-based.
    pub position: usize,
    pub identifier: String,
    /// Display name, or the identifier when no name was resolved.
    pub display: String,
    pub wins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeLeaderboard {
    pub mode: GameModeSpec,
    pub entries: Vec<RankedEntry>,
}

#[derive(Debug, Clone, Copy)]
pub struct LeaderboardRanker {
    top_n: usize,
}

impl LeaderboardRanker {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// One leaderboard per mode, in the order `modes` is given.
    ///
    /// Records are sorted by wins descending with a stable sort, so equal
    /// win counts keep the order of `records`. Every mode sorts from the
    /// input order, not from the previous mode's result.
    pub fn rank(&self, records: &[PlayerRecord], modes: &[GameModeSpec]) -> Vec<ModeLeaderboard> {
        modes
            .iter()
            .map(|mode| ModeLeaderboard {
                mode: mode.clone(),
                entries: self.rank_mode(records, &mode.field_key),
            })
            .collect()
    }

    fn rank_mode(&self, records: &[PlayerRecord], field_key: &str) -> Vec<RankedEntry> {
        let mut ordered: Vec<&PlayerRecord> = records.iter().collect();
        ordered.sort_by(|a, b| b.wins(field_key).cmp(&a.wins(field_key)));

        ordered
            .into_iter()
            .take(self.top_n)
            .enumerate()
            .map(|(i, record)| RankedEntry {
                position: i + 1,
                identifier: record.identifier().to_string(),
                display: record.display_key().to_string(),
                wins: record.wins(field_key),
            })
            .collect()
    }
}
