//! Remote endpoint catalogue and URL construction.

use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.voxyl.net";
pub const DEFAULT_IDENTITY_BASE: &str = "https://api.ashcon.app/mojang/v2/user";

/// Entries requested from each global board.
pub const LEADERBOARD_SIZE: u32 = 100;

/// Ranking metric for the global player leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardMetric {
    Level,
    WeightedWins,
}

impl LeaderboardMetric {
    pub fn as_param(&self) -> &'static str {
        match self {
            LeaderboardMetric::Level => "level",
            LeaderboardMetric::WeightedWins => "weightedwins",
        }
    }
}

/// A request against one of the remote endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Leaderboard { metric: LeaderboardMetric, count: u32 },
    GuildLeaderboard { count: u32 },
    GuildMembers { tag: &'a str },
    PlayerStats { uuid: &'a str },
    Identity { uuid: &'a str },
}

/// Base URLs for the statistics API and the identity lookup service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_base: String,
    identity_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            identity_base: DEFAULT_IDENTITY_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// Both bases must be absolute URLs.
    pub fn new(api_base: &str, identity_base: &str) -> Result<Self, url::ParseError> {
        Url::parse(api_base)?;
        Url::parse(identity_base)?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            identity_base: identity_base.trim_end_matches('/').to_string(),
        })
    }

    /// Build the full request URL, including the API key where the endpoint needs one.
    pub fn resolve(&self, endpoint: &Endpoint<'_>, api_key: &str) -> Result<Url, url::ParseError> {
        match *endpoint {
            Endpoint::Leaderboard { metric, count } => {
                let count = count.to_string();
                Url::parse_with_params(
                    &format!("{}/leaderboard/normal/", self.api_base),
                    &[
                        ("api", api_key),
                        ("num", count.as_str()),
                        ("type", metric.as_param()),
                    ],
                )
            }
            Endpoint::GuildLeaderboard { count } => {
                let count = count.to_string();
                Url::parse_with_params(
                    &format!("{}/guild/top/", self.api_base),
                    &[("api", api_key), ("num", count.as_str())],
                )
            }
            Endpoint::GuildMembers { tag } => Url::parse_with_params(
                &format!(
                    "{}/guild/members/{}",
                    self.api_base,
                    urlencoding::encode(tag)
                ),
                &[("api", api_key)],
            ),
            Endpoint::PlayerStats { uuid } => Url::parse_with_params(
                &format!(
                    "{}/player/stats/game/{}",
                    self.api_base,
                    urlencoding::encode(uuid)
                ),
                &[("api", api_key)],
            ),
            Endpoint::Identity { uuid } => Url::parse(&format!(
                "{}/{}",
                self.identity_base,
                urlencoding::encode(uuid)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_url_carries_metric_and_count() {
        let url = Endpoints::default()
            .resolve(
                &Endpoint::Leaderboard {
                    metric: LeaderboardMetric::WeightedWins,
                    count: LEADERBOARD_SIZE,
                },
                "key",
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.voxyl.net/leaderboard/normal/?api=key&num=100&type=weightedwins"
        );
    }

    #[test]
    fn guild_tag_is_path_encoded() {
        let url = Endpoints::default()
            .resolve(&Endpoint::GuildMembers { tag: "A B" }, "key")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.voxyl.net/guild/members/A%20B?api=key"
        );
    }

    #[test]
    fn identity_lookup_has_no_key() {
        let url = Endpoints::default()
            .resolve(&Endpoint::Identity { uuid: "abc" }, "key")
            .unwrap();
        assert_eq!(url.as_str(), "https://api.ashcon.app/mojang/v2/user/abc");
        assert!(url.query().is_none());
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let endpoints = Endpoints::new("http://localhost:8080/", DEFAULT_IDENTITY_BASE).unwrap();
        let url = endpoints
            .resolve(&Endpoint::PlayerStats { uuid: "u1" }, "k")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/player/stats/game/u1?api=k");
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(Endpoints::new("api.voxyl.net", DEFAULT_IDENTITY_BASE).is_err());
    }
}
