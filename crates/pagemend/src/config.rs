//! Where the CLI finds its settings.
//!
//! An explicit `--config` path must exist. Without one, the first file found
//! in [`search_paths`] is used, and a machine with neither runs on defaults.

use pagemend_core::config::PageMendConfig;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up relative to the working directory.
pub const LOCAL_FILE: &str = "pagemend.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Candidate files in priority order: the working directory, then the
/// per-user `~/.pagemend/config.yaml`.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_FILE)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".pagemend").join("config.yaml"));
    }
    paths
}

pub async fn load(explicit: Option<&Path>) -> Result<PageMendConfig, ConfigError> {
    if let Some(path) = explicit {
        return read(path).await;
    }
    for path in search_paths() {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "using config file");
            return read(&path).await;
        }
    }
    tracing::debug!("no config file found, using defaults");
    Ok(PageMendConfig::default())
}

/// Parses one file. Blank files mean "all defaults".
pub async fn read(path: &Path) -> Result<PageMendConfig, ConfigError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if text.trim().is_empty() {
        return Ok(PageMendConfig::default());
    }
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
