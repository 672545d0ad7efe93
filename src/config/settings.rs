//! Effective runtime settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::ConfigError;
use crate::http_client::endpoints::{DEFAULT_API_BASE, DEFAULT_IDENTITY_BASE};
use crate::http_client::{ApiClient, ApiClientBuilder, Endpoints, Transport};
use crate::report::DEFAULT_REPORT_TITLE;
use crate::run::RunOptions;

/// Application settings, fully resolved from defaults, config file and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Credential sent with every statistics API request.
    pub api_key: String,
    /// Requests allowed per rate window.
    pub requests_per_window: usize,
    /// Rate window length in seconds.
    pub window_secs: u64,
    /// Players listed per game mode.
    pub top_n: usize,
    /// Log upstream error responses at warn level.
    pub output_errors: bool,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// User agent override.
    pub user_agent: Option<String>,
    /// Wait out the window after the final stats batch.
    pub trailing_cooldown: bool,
    pub seeds_path: PathBuf,
    pub gamemodes_path: PathBuf,
    pub output_path: PathBuf,
    pub api_base: String,
    pub identity_base: String,
    pub report_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            requests_per_window: 400,
            window_secs: 60,
            top_n: 25,
            output_errors: false,
            request_timeout: 30,
            user_agent: None,
            trailing_cooldown: false,
            seeds_path: PathBuf::from("input_uuids.txt"),
            gamemodes_path: PathBuf::from("gamemodes.json"),
            output_path: PathBuf::from("output.txt"),
            api_base: DEFAULT_API_BASE.to_string(),
            identity_base: DEFAULT_IDENTITY_BASE.to_string(),
            report_title: DEFAULT_REPORT_TITLE.to_string(),
        }
    }
}

impl Settings {
    /// Reject settings the run cannot work with.
    ///
    /// An empty API key only warns: every keyed request will come back
    /// empty, but the run still completes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests_per_window == 0 {
            return Err(ConfigError::Invalid(
                "requests_per_window must be at least 1".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".to_string()));
        }
        if self.api_key.trim().is_empty() {
            warn!("No API key configured (set VOXBOARD_API_KEY); statistics requests will fail");
        }
        self.endpoints()?;
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        Endpoints::new(&self.api_base, &self.identity_base).map_err(|e| {
            ConfigError::Invalid(format!(
                "invalid endpoint base URL ({} / {}): {}",
                self.api_base, self.identity_base, e
            ))
        })
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            batch_size: self.requests_per_window,
            window: self.window(),
            trailing_cooldown: self.trailing_cooldown,
            top_n: self.top_n,
        }
    }

    /// Build an API client over reqwest.
    pub fn api_client(&self) -> Result<ApiClient, ConfigError> {
        self.client_builder()?
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {}", e)))
    }

    /// Build an API client over a caller-supplied transport.
    pub fn api_client_with_transport(
        &self,
        transport: Arc<dyn Transport>,
    ) -> Result<ApiClient, ConfigError> {
        self.client_builder()?
            .transport(transport)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {}", e)))
    }

    fn client_builder(&self) -> Result<ApiClientBuilder, ConfigError> {
        let mut builder = ApiClient::builder(&self.api_key)
            .endpoints(self.endpoints()?)
            .timeout(self.timeout())
            .output_errors(self.output_errors);
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_budget() {
        let settings = Settings::default();
        assert_eq!(settings.requests_per_window, 400);
        assert_eq!(settings.window(), Duration::from_secs(60));
        assert_eq!(settings.top_n, 25);
        assert!(!settings.output_errors);
        assert!(!settings.trailing_cooldown);
        assert_eq!(settings.output_path, PathBuf::from("output.txt"));
    }

    #[test]
    fn zero_budget_is_rejected() {
        let settings = Settings {
            requests_per_window: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let settings = Settings {
            top_n: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_api_key_is_only_a_warning() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let settings = Settings {
            api_base: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn run_options_follow_settings() {
        let settings = Settings {
            requests_per_window: 10,
            window_secs: 5,
            top_n: 3,
            trailing_cooldown: true,
            ..Settings::default()
        };
        let options = settings.run_options();
        assert_eq!(options.batch_size, 10);
        assert_eq!(options.window, Duration::from_secs(5));
        assert_eq!(options.top_n, 3);
        assert!(options.trailing_cooldown);
    }
}
