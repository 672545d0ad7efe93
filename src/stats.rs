//! Per-player stats collection.

use tracing::info;

use crate::http_client::{ApiClient, Endpoint};
use crate::models::api::{IdentityResponse, PlayerStatsResponse};
use crate::models::{Identifier, PlayerRecord};
use crate::scheduler::{BatchObserver, BatchScheduler};

pub struct StatsAggregator {
    client: ApiClient,
}

impl StatsAggregator {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch stats and display name for one player.
    ///
    /// Always yields a record: a failed stats fetch leaves the win map empty,
    /// a failed identity lookup leaves the display name empty.
    pub async fn build_record(&self, identifier: &str) -> PlayerRecord {
        let stats: PlayerStatsResponse = self
            .client
            .fetch(&Endpoint::PlayerStats { uuid: identifier })
            .await
            .parse_or_default();

        let identity: IdentityResponse = self
            .client
            .fetch(&Endpoint::Identity { uuid: identifier })
            .await
            .parse_or_default();

        PlayerRecord::new(
            identifier,
            identity.username.as_deref().unwrap_or_default(),
            stats.win_counts(),
        )
    }

    /// Build records for every identifier, batched through `scheduler`.
    /// Output order follows `identifiers`.
    pub async fn collect(
        &self,
        identifiers: &[Identifier],
        scheduler: &BatchScheduler,
        observer: &dyn BatchObserver,
    ) -> Vec<PlayerRecord> {
        info!(
            "Scanning {} players in {} batches of up to {}, {:?} apart",
            identifiers.len(),
            scheduler.batch_count(identifiers.len()),
            scheduler.batch_size(),
            scheduler.cooldown()
        );

        scheduler
            .run_batched(identifiers, |id| self.build_record(id), observer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::mock::MockTransport;
    use crate::scheduler::NoProgress;
    use std::sync::Arc;
    use std::time::Duration;

    fn aggregator(transport: MockTransport) -> (StatsAggregator, ApiClient) {
        let client = ApiClient::builder("key")
            .transport(Arc::new(transport))
            .build()
            .unwrap();
        (StatsAggregator::new(client.clone()), client)
    }

    #[tokio::test]
    async fn record_has_wins_and_name() {
        let (aggregator, client) = aggregator(
            MockTransport::new()
                .route(
                    "/player/stats/game/u1",
                    200,
                    r#"{"stats":{"bedRush":{"wins":7},"sumo":{"kills":2}}}"#,
                )
                .route("/mojang/v2/user/u1", 200, r#"{"username":"Steve"}"#),
        );

        let record = aggregator.build_record("u1").await;

        assert_eq!(record.identifier(), "u1");
        assert_eq!(record.display_name(), "Steve");
        assert_eq!(record.wins("bedRush"), 7);
        assert!(!record.win_counts().contains_key("sumo"));
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn failed_lookups_still_produce_record() {
        let (aggregator, client) = aggregator(MockTransport::new().fail("/"));

        let record = aggregator.build_record("u1").await;

        assert_eq!(record.identifier(), "u1");
        assert_eq!(record.display_name(), "");
        assert!(record.win_counts().is_empty());
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn collect_isolates_failures() {
        let (aggregator, _) = aggregator(
            MockTransport::new()
                .route("/player/stats/game/a", 200, r#"{"stats":{"x":{"wins":5}}}"#)
                .fail("/player/stats/game/b")
                .route("/player/stats/game/c", 200, r#"{"stats":{"x":{"wins":1}}}"#),
        );
        let ids: Vec<String> = ["a", "b", "c"].into_iter().map(String::from).collect();

        let records = aggregator
            .collect(&ids, &BatchScheduler::new(3, Duration::ZERO), &NoProgress)
            .await;

        let wins: Vec<u64> = records.iter().map(|r| r.wins("x")).collect();
        assert_eq!(wins, vec![5, 0, 1]);
        let order: Vec<&str> = records.iter().map(|r| r.identifier()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn never_more_requests_in_flight_than_batch_size() {
        let transport = Arc::new(
            MockTransport::new()
                .route("/player/stats/", 200, r#"{"stats":{}}"#)
                .with_delay(Duration::from_millis(10)),
        );
        let client = ApiClient::builder("key")
            .transport(transport.clone())
            .build()
            .unwrap();
        let ids: Vec<String> = (0..5).map(|i| format!("p{}", i)).collect();

        let records = StatsAggregator::new(client.clone())
            .collect(&ids, &BatchScheduler::new(2, Duration::ZERO), &NoProgress)
            .await;

        assert_eq!(records.len(), 5);
        assert_eq!(transport.max_in_flight(), 2);
        assert_eq!(client.request_count(), 10);
    }
}
