use std::path::PathBuf;

use face_graph::SamplingConfig;
use serde::{Deserialize, Serialize};

/// Maximum number of history records kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// File name of the per-user history file under the home directory.
pub const HISTORY_FILE_NAME: &str = ".face_segmentation_history.json";

/// History store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Records beyond this count evict the oldest.
    pub capacity: usize,
    /// Persistence file; `None` keeps history in memory only.
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            path: default_history_path(),
        }
    }
}

impl HistoryConfig {
    /// In-memory history with the default capacity.
    pub fn in_memory() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            path: None,
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            path: Some(path.into()),
        }
    }
}

/// `$HOME/.face_segmentation_history.json`, or `None` when `HOME` is unset.
pub fn default_history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE_NAME))
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub sampling: SamplingConfig,
    pub history: HistoryConfig,
    /// Record a history entry after every successful run.
    pub record_history: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            history: HistoryConfig::default(),
            record_history: true,
        }
    }
}

impl SessionConfig {
    /// Default sampling with history kept in memory. Used by tests and tools
    /// that must not touch the user's history file.
    pub fn ephemeral() -> Self {
        Self {
            history: HistoryConfig::in_memory(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"history": {"capacity": 5}, "record_history": false}"#)
                .unwrap();
        assert_eq!(config.history.capacity, 5);
        assert!(!config.record_history);
        assert_eq!(config.sampling, SamplingConfig::default());
    }

    #[test]
    fn ephemeral_has_no_history_file() {
        assert!(SessionConfig::ephemeral().history.path.is_none());
        assert_eq!(SessionConfig::ephemeral().history.capacity, 50);
    }
}
