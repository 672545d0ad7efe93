//! Configuration loading.
//!
//! Precedence, lowest first: built-in defaults, config file, environment
//! (including `.env`), command-line flags. The CLI applies its flags on top
//! of what `load_settings_with_options` returns.

mod gamemodes;
mod settings;

pub use gamemodes::{load_game_modes, parse_game_modes, GameModeError};
pub use settings::Settings;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File names looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "voxboard.toml",
    "voxboard.json",
    "voxboard.yaml",
    "voxboard.yml",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration file structure. Every field is optional; unset fields keep
/// the value from the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Requests allowed per rate window.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "requests_per_minute"
    )]
    pub requests_per_window: Option<usize>,
    /// Rate window length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_errors: Option<bool>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_cooldown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamemodes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_title: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file path.
    /// The format is picked by extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            _ => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// First config file found in `dir`, if any.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref key) = self.api_key {
            settings.api_key = key.clone();
        }
        if let Some(requests) = self.requests_per_window {
            settings.requests_per_window = requests;
        }
        if let Some(window) = self.window_secs {
            settings.window_secs = window;
        }
        if let Some(top_n) = self.top_n {
            settings.top_n = top_n;
        }
        if let Some(output_errors) = self.output_errors {
            settings.output_errors = output_errors;
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(trailing) = self.trailing_cooldown {
            settings.trailing_cooldown = trailing;
        }
        if let Some(ref seeds) = self.seeds {
            settings.seeds_path = self.resolve_path(seeds, base_dir);
        }
        if let Some(ref gamemodes) = self.gamemodes {
            settings.gamemodes_path = self.resolve_path(gamemodes, base_dir);
        }
        if let Some(ref output) = self.output {
            settings.output_path = self.resolve_path(output, base_dir);
        }
        if let Some(ref base) = self.api_base {
            settings.api_base = base.clone();
        }
        if let Some(ref base) = self.identity_base {
            settings.identity_base = base.clone();
        }
        if let Some(ref title) = self.report_title {
            settings.report_title = title.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file location.
    pub use_cwd: bool,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply `VOXBOARD_*` environment variables. `lookup` is `std::env::var`
/// outside of tests. Unparseable values are ignored with a warning.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|s| !s.is_empty());

    if let Some(key) = get("VOXBOARD_API_KEY") {
        tracing::debug!("Using VOXBOARD_API_KEY from environment");
        settings.api_key = key;
    }
    if let Some(raw) = get("VOXBOARD_REQUESTS_PER_MINUTE") {
        match raw.trim().parse() {
            Ok(n) => settings.requests_per_window = n,
            Err(_) => tracing::warn!("Ignoring VOXBOARD_REQUESTS_PER_MINUTE={:?}", raw),
        }
    }
    if let Some(raw) = get("VOXBOARD_TOP_N") {
        match raw.trim().parse() {
            Ok(n) => settings.top_n = n,
            Err(_) => tracing::warn!("Ignoring VOXBOARD_TOP_N={:?}", raw),
        }
    }
    if let Some(raw) = get("VOXBOARD_OUTPUT_ERRORS") {
        match parse_flag(&raw) {
            Some(flag) => settings.output_errors = flag,
            None => tracing::warn!("Ignoring VOXBOARD_OUTPUT_ERRORS={:?}", raw),
        }
    }
    if let Some(raw) = get("VOXBOARD_TRAILING_COOLDOWN") {
        match parse_flag(&raw) {
            Some(flag) => settings.trailing_cooldown = flag,
            None => tracing::warn!("Ignoring VOXBOARD_TRAILING_COOLDOWN={:?}", raw),
        }
    }
    if let Some(base) = get("VOXBOARD_API_BASE") {
        settings.api_base = base;
    }
}

/// Load settings with explicit options.
/// The returned settings are not yet validated.
pub async fn load_settings_with_options(options: LoadOptions) -> Result<Settings, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Priority 1: explicit --config, Priority 2: discovery in the working directory
    let config_path = options.config_path.or_else(|| Config::discover(&cwd));
    let config = match config_path {
        Some(ref path) => {
            tracing::debug!("Loading config from {}", path.display());
            Config::load_from_path(path).await?
        }
        None => Config::default(),
    };

    let base_dir = if options.use_cwd {
        cwd.clone()
    } else {
        config.base_dir().unwrap_or_else(|| cwd.clone())
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    Ok(settings)
}
