//! Fetch results and upstream error decoding.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Result of one API fetch.
///
/// Transport failures, non-2xx statuses and unparseable bodies all collapse
/// to `Empty`; callers treat it as "no data" rather than as an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    Json(Value),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Deserialize into `T`, falling back to `T::default()` when the payload
    /// is empty or its shape does not match.
    pub fn parse_or_default<T: DeserializeOwned + Default>(&self) -> T {
        match self {
            Payload::Empty => T::default(),
            Payload::Json(value) => T::deserialize(value).unwrap_or_else(|e| {
                tracing::debug!(
                    "Unexpected payload shape for {}: {}",
                    std::any::type_name::<T>(),
                    e
                );
                T::default()
            }),
        }
    }
}

/// Non-success response reported by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamDiagnostic {
    pub status: u16,
    pub reason: String,
    pub url: String,
}

impl fmt::Display for UpstreamDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR - Code: {} - Reason: {} - URL: {}",
            self.status, self.reason, self.url
        )
    }
}

/// Pull the error reason out of an upstream error body.
/// Checks `reason`, then `error`, then gives up with "Unknown".
pub fn upstream_reason(body: Option<&Value>) -> String {
    let Some(body) = body else {
        return "Unknown".to_string();
    };

    ["reason", "error"]
        .iter()
        .find_map(|field| body.get(field))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Replace the value of the `api` query parameter so keys never reach logs.
pub fn redact_api_key(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };

    if !parsed.query_pairs().any(|(k, _)| k == "api") {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            if k == "api" {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        names: Vec<String>,
    }

    #[test]
    fn empty_payload_parses_to_default() {
        let parsed: Sample = Payload::Empty.parse_or_default();
        assert_eq!(parsed, Sample::default());
    }

    #[test]
    fn mismatched_shape_parses_to_default() {
        let payload = Payload::Json(json!({"names": "not-a-list"}));
        let parsed: Sample = payload.parse_or_default();
        assert!(parsed.names.is_empty());
    }

    #[test]
    fn matching_shape_parses() {
        let payload = Payload::Json(json!({"names": ["a", "b"]}));
        let parsed: Sample = payload.parse_or_default();
        assert_eq!(parsed.names, vec!["a", "b"]);
    }

    #[test]
    fn reason_prefers_reason_field() {
        let body = json!({"reason": "Invalid API key", "error": "other"});
        assert_eq!(upstream_reason(Some(&body)), "Invalid API key");
    }

    #[test]
    fn reason_falls_back_to_error_field() {
        let body = json!({"error": "Rate limited"});
        assert_eq!(upstream_reason(Some(&body)), "Rate limited");
    }

    #[test]
    fn reason_defaults_to_unknown() {
        assert_eq!(upstream_reason(Some(&json!({"success": false}))), "Unknown");
        assert_eq!(upstream_reason(None), "Unknown");
    }

    #[test]
    fn diagnostic_display() {
        let diag = UpstreamDiagnostic {
            status: 429,
            reason: "Too many requests".to_string(),
            url: "https://api.voxyl.net/guild/top/".to_string(),
        };
        assert_eq!(
            diag.to_string(),
            "ERROR - Code: 429 - Reason: Too many requests - URL: https://api.voxyl.net/guild/top/"
        );
    }

    #[test]
    fn redacts_api_key() {
        let redacted = redact_api_key("https://api.voxyl.net/guild/top/?api=secret&num=100");
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("num=100"));
    }

    #[test]
    fn redact_leaves_keyless_urls_alone() {
        let url = "https://api.ashcon.app/mojang/v2/user/abc";
        assert_eq!(redact_api_key(url), url);
    }
}
