//! Seed identifier list.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Identifier;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One identifier per line; surrounding whitespace is trimmed and blank lines skipped.
pub fn parse_seeds(contents: &str) -> Vec<Identifier> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn read_seed_file(path: &Path) -> Result<Vec<Identifier>, SeedError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_seeds(&contents))
}
