//! API client that reduces every call to payload-or-empty.
//!
//! The client never fails a fetch. Transport errors, upstream error statuses
//! and malformed bodies all come back as `Payload::Empty`, optionally with a
//! diagnostic logged. Every attempt is counted, whatever its outcome.
//!
//! Rate enforcement is not done here: the batch scheduler sizes batches to
//! the request budget and waits out the window between them.

pub mod endpoints;
mod response;
mod transport;

pub use endpoints::{Endpoint, Endpoints, LeaderboardMetric, LEADERBOARD_SIZE};
pub use response::{redact_api_key, upstream_reason, Payload, UpstreamDiagnostic};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};

#[cfg(test)]
pub(crate) use transport::mock;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

pub const USER_AGENT: &str = concat!("voxboard/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolve user agent from config value; `None` means the crate default.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

/// Shared request accounting. Cloned clients share one instance.
#[derive(Debug, Default)]
struct RequestCounters {
    attempted: AtomicU64,
    failed: AtomicU64,
}

/// Client for the statistics and identity APIs.
///
/// Cheap to clone; clones share the transport and the request counters, so
/// one client value can be handed to every component that issues requests.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    endpoints: Arc<Endpoints>,
    api_key: Arc<str>,
    counters: Arc<RequestCounters>,
    output_errors: bool,
}

/// Builder for `ApiClient`.
///
/// Without an explicit transport, `build()` creates a `ReqwestTransport`
/// with the configured user agent and timeout.
pub struct ApiClientBuilder {
    api_key: String,
    endpoints: Endpoints,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
    user_agent: Option<String>,
    output_errors: bool,
}

impl ApiClientBuilder {
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }

    /// Log upstream error responses at warn level instead of debug.
    pub fn output_errors(mut self, enabled: bool) -> Self {
        self.output_errors = enabled;
        self
    }

    pub fn build(self) -> Result<ApiClient, TransportError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = resolve_user_agent(self.user_agent.as_deref());
                Arc::new(ReqwestTransport::new(&user_agent, self.timeout)?)
            }
        };

        Ok(ApiClient {
            transport,
            endpoints: Arc::new(self.endpoints),
            api_key: Arc::from(self.api_key),
            counters: Arc::new(RequestCounters::default()),
            output_errors: self.output_errors,
        })
    }
}

impl ApiClient {
    pub fn builder(api_key: &str) -> ApiClientBuilder {
        ApiClientBuilder {
            api_key: api_key.to_string(),
            endpoints: Endpoints::default(),
            transport: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            output_errors: false,
        }
    }

    /// Total fetch attempts so far, failed ones included.
    pub fn request_count(&self) -> u64 {
        self.counters.attempted.load(Ordering::Relaxed)
    }

    /// Fetch attempts that came back empty because of a failure.
    pub fn failed_count(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Issue one request. Never fails: any problem yields `Payload::Empty`.
    pub async fn fetch(&self, endpoint: &Endpoint<'_>) -> Payload {
        self.counters.attempted.fetch_add(1, Ordering::Relaxed);

        let url = match self.endpoints.resolve(endpoint, &self.api_key) {
            Ok(url) => url,
            Err(e) => {
                debug!("Could not build URL for {:?}: {}", endpoint, e);
                return self.failed();
            }
        };

        match self.transport.get(&url).await {
            Ok(raw) => self.decode(raw),
            Err(e) => {
                debug!(
                    "Transport error for {}: {}",
                    redact_api_key(url.as_str()),
                    e
                );
                self.failed()
            }
        }
    }

    fn decode(&self, raw: RawResponse) -> Payload {
        let body: Option<Value> = serde_json::from_str(&raw.body).ok();

        if raw.is_success() {
            return match body {
                Some(value) => Payload::Json(value),
                None => {
                    debug!("Malformed JSON body from {}", redact_api_key(&raw.url));
                    self.failed()
                }
            };
        }

        let diagnostic = UpstreamDiagnostic {
            status: raw.status,
            reason: upstream_reason(body.as_ref()),
            url: redact_api_key(&raw.url),
        };
        if self.output_errors {
            warn!("{}", diagnostic);
        } else {
            debug!("{}", diagnostic);
        }
        self.failed()
    }

    fn failed(&self) -> Payload {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        Payload::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{silent_server, MockTransport};
    use super::*;
    use serde_json::json;

    fn client(transport: MockTransport) -> (ApiClient, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let client = ApiClient::builder("key")
            .transport(transport.clone())
            .build()
            .unwrap();
        (client, transport)
    }

    #[tokio::test]
    async fn success_returns_json() {
        let (client, _) = client(MockTransport::new().route(
            "/guild/top/",
            200,
            r#"{"guilds":[{"tag":"ABC"}]}"#,
        ));

        let payload = client
            .fetch(&Endpoint::GuildLeaderboard { count: 100 })
            .await;

        assert_eq!(payload, Payload::Json(json!({"guilds": [{"tag": "ABC"}]})));
        assert_eq!(client.request_count(), 1);
        assert_eq!(client.failed_count(), 0);
    }

    #[tokio::test]
    async fn error_status_returns_empty() {
        let (client, _) = client(MockTransport::new().route(
            "/guild/top/",
            403,
            r#"{"success":false,"reason":"Invalid API Key"}"#,
        ));

        let payload = client
            .fetch(&Endpoint::GuildLeaderboard { count: 100 })
            .await;

        assert!(payload.is_empty());
        assert_eq!(client.failed_count(), 1);
    }

    #[tokio::test]
    async fn transport_error_returns_empty() {
        let (client, _) = client(MockTransport::new().fail("/player/stats/"));

        let payload = client.fetch(&Endpoint::PlayerStats { uuid: "u1" }).await;

        assert!(payload.is_empty());
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn malformed_body_returns_empty() {
        let (client, _) =
            client(MockTransport::new().route("/player/stats/", 200, "<html>oops</html>"));

        let payload = client.fetch(&Endpoint::PlayerStats { uuid: "u1" }).await;

        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn counter_includes_every_attempt() {
        let (client, transport) = client(
            MockTransport::new()
                .route("/player/stats/game/good", 200, r#"{"stats":{}}"#)
                .fail("/player/stats/game/broken"),
        );

        client.fetch(&Endpoint::PlayerStats { uuid: "good" }).await;
        client.fetch(&Endpoint::PlayerStats { uuid: "broken" }).await;
        client.fetch(&Endpoint::PlayerStats { uuid: "missing" }).await;

        assert_eq!(client.request_count(), 3);
        assert_eq!(client.failed_count(), 2);
        assert_eq!(transport.requested().len(), 3);
    }

    #[tokio::test]
    async fn concurrent_fetches_do_not_lose_counts() {
        let (client, _) = client(MockTransport::new().route("/player/stats/", 200, "{}"));

        let futures: Vec<_> = (0..50)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let uuid = format!("u{}", i);
                    client.fetch(&Endpoint::PlayerStats { uuid: &uuid }).await
                })
            })
            .collect();
        for handle in futures {
            handle.await.unwrap();
        }

        assert_eq!(client.request_count(), 50);
    }

    #[test]
    fn test_resolve_user_agent_default() {
        assert!(resolve_user_agent(None).starts_with("voxboard/"));
    }

    #[test]
    fn test_resolve_user_agent_custom() {
        assert_eq!(resolve_user_agent(Some("MyBot/1.0")), "MyBot/1.0");
    }

    #[tokio::test]
    async fn hung_request_counts_as_failed() {
        let base = silent_server().await;
        let client = ApiClient::builder("key")
            .endpoints(Endpoints::new(&base, &base).unwrap())
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let payload = tokio::time::timeout(
            Duration::from_secs(5),
            client.fetch(&Endpoint::PlayerStats { uuid: "u1" }),
        )
        .await
        .expect("fetch should give up on its own");

        assert_eq!(payload, Payload::Empty);
        assert_eq!(client.request_count(), 1);
        assert_eq!(client.failed_count(), 1);
    }
}
