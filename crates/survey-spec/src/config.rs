use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::answers::{AnonymityPolicy, EncodePolicy};

pub const DEFAULT_RESULTS_DIR: &str = "Results";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Survey settings, read from a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymity: Option<AnonymityPolicy>,
    /// Where save dialogs start. Defaults to [`DEFAULT_RESULTS_DIR`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_dir: Option<PathBuf>,
}

impl SurveyConfig {
    /// Blank input yields the default config.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded survey config");
        Ok(config)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.results_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR))
    }

    pub fn encode_policy(&self) -> EncodePolicy {
        EncodePolicy {
            anonymity: self.anonymity.clone(),
        }
    }
}
