//! Text report rendering and publishing.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::models::RunMetrics;
use crate::ranking::ModeLeaderboard;

pub const DEFAULT_REPORT_TITLE: &str = "BEDWARS PRACTICE GAMEMODE LEADERBOARDS";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders leaderboards plus run metrics into the plain-text report.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    title: String,
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_TITLE)
    }
}

impl ReportComposer {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }

    pub fn render(&self, leaderboards: &[ModeLeaderboard], metrics: &RunMetrics) -> String {
        let (hours, minutes, seconds) = metrics.elapsed_hms();

        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}\n", self.title);
        let _ = writeln!(out, "Players Scanned: {} players", metrics.players_scanned);
        let _ = writeln!(out, "API Requests: {} requests", metrics.total_requests);
        let _ = writeln!(out, "Time Elapsed: {}h {}m {}s", hours, minutes, seconds);

        for board in leaderboards {
            let _ = writeln!(out, "\n**{}**", board.mode.display_name.to_uppercase());
            for entry in &board.entries {
                let _ = writeln!(
                    out,
                    "{}) {} - {} wins",
                    entry.position, entry.display, entry.wins
                );
            }
        }

        out
    }
}

/// Destination for a finished run.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(
        &self,
        leaderboards: &[ModeLeaderboard],
        metrics: &RunMetrics,
    ) -> Result<(), ReportError>;
}

/// Writes the rendered report to a file, replacing any previous content.
pub struct TextFileSink {
    path: PathBuf,
    composer: ReportComposer,
}

impl TextFileSink {
    pub fn new(path: impl Into<PathBuf>, composer: ReportComposer) -> Self {
        Self {
            path: path.into(),
            composer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSink for TextFileSink {
    async fn publish(
        &self,
        leaderboards: &[ModeLeaderboard],
        metrics: &RunMetrics,
    ) -> Result<(), ReportError> {
        let report = self.composer.render(leaderboards, metrics);
        tokio::fs::write(&self.path, report)
            .await
            .map_err(|source| ReportError::Write {
                path: self.path.clone(),
                source,
            })?;
        info!("Report written to {}", self.path.display());
        Ok(())
    }
}
