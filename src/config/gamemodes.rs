//! Game mode list loading.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::GameModeSpec;

#[derive(Debug, Error)]
pub enum GameModeError {
    #[error("Failed to read game mode file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse game mode file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Game mode {index} in '{path}' has an empty api_name")]
    MissingField { path: PathBuf, index: usize },
}

/// Parse a JSON array of `{"name": ..., "api_name": ...}` records.
/// Order is kept; it is the order the report lists modes in.
pub fn parse_game_modes(contents: &str, path: &Path) -> Result<Vec<GameModeSpec>, GameModeError> {
    let modes: Vec<GameModeSpec> =
        serde_json::from_str(contents).map_err(|source| GameModeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(index) = modes.iter().position(|m| m.field_key.trim().is_empty()) {
        return Err(GameModeError::MissingField {
            path: path.to_path_buf(),
            index,
        });
    }

    if modes.is_empty() {
        tracing::warn!("No game modes in {}; report will have no leaderboards", path.display());
    }
    Ok(modes)
}

pub async fn load_game_modes(path: &Path) -> Result<Vec<GameModeSpec>, GameModeError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| GameModeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_game_modes(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_file_order() {
        let modes = parse_game_modes(
            r#"[{"name": "Sumo", "api_name": "sumo"}, {"name": "Bed Rush", "api_name": "bedRush"}]"#,
            Path::new("gamemodes.json"),
        )
        .unwrap();
        assert_eq!(
            modes,
            vec![
                GameModeSpec::new("Sumo", "sumo"),
                GameModeSpec::new("Bed Rush", "bedRush"),
            ]
        );
    }

    #[test]
    fn not_an_array() {
        let err = parse_game_modes(r#"{"name": "Sumo"}"#, Path::new("g.json")).unwrap_err();
        assert!(matches!(err, GameModeError::Parse { .. }));
    }

    #[test]
    fn blank_api_name() {
        let err = parse_game_modes(
            r#"[{"name": "Sumo", "api_name": "sumo"}, {"name": "Broken", "api_name": " "}]"#,
            Path::new("g.json"),
        )
        .unwrap_err();
        assert!(matches!(err, GameModeError::MissingField { index: 1, .. }));
    }

    #[tokio::test]
    async fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_game_modes(&dir.path().join("gamemodes.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, GameModeError::Read { .. }));
    }
}
