//! Wire shapes of the remote API responses.
//!
//! Every field defaults so that a partial or unexpected body degrades to
//! "nothing found" instead of failing the whole payload.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

/// String field of one list element. Elements that are not objects, or whose
/// field is missing or not a string, yield nothing.
fn string_field(entry: &Value, field: &str) -> Option<String> {
    entry.get(field)?.as_str().map(str::to_string)
}

/// `GET /leaderboard/normal/`
///
/// Entries stay untyped so that one malformed entry drops only itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub players: Vec<Value>,
}

impl LeaderboardResponse {
    pub fn identifiers(self) -> impl Iterator<Item = String> {
        self.players
            .into_iter()
            .filter_map(|p| string_field(&p, "uuid"))
    }
}

/// `GET /guild/top/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildLeaderboardResponse {
    #[serde(default)]
    pub guilds: Vec<Value>,
}

impl GuildLeaderboardResponse {
    pub fn tags(self) -> impl Iterator<Item = String> {
        self.guilds
            .into_iter()
            .filter_map(|g| string_field(&g, "tag"))
    }
}

/// `GET /guild/members/{tag}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildMembersResponse {
    #[serde(default)]
    pub members: Vec<Value>,
}

impl GuildMembersResponse {
    pub fn identifiers(self) -> impl Iterator<Item = String> {
        self.members
            .into_iter()
            .filter_map(|m| string_field(&m, "uuid"))
    }
}

/// `GET /player/stats/game/{uuid}`
///
/// Per-game stat blocks are kept loosely typed: only `wins` is read, and a
/// block that is not an object or has no numeric `wins` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStatsResponse {
    #[serde(default)]
    pub stats: HashMap<String, Value>,
}

impl PlayerStatsResponse {
    /// Win counts keyed by game name, for games that report one.
    pub fn win_counts(&self) -> BTreeMap<String, u64> {
        self.stats
            .iter()
            .filter_map(|(game, stats)| {
                stats
                    .get("wins")
                    .and_then(whole_number)
                    .map(|wins| (game.clone(), wins))
            })
            .collect()
    }
}

/// Non-negative integer, also accepted when encoded as a float like `12.0`.
fn whole_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

/// Identity lookup, `GET {identity_base}/{uuid}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityResponse {
    #[serde(default)]
    pub username: Option<String>,
}
