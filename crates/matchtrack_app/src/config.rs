//! Application configuration: an optional RON file overridden by CLI flags.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use matchtrack_core::Thresholds;
use matchtrack_engine::{
    FileHistoryStorage, ServiceSettings, TrackerConfig, DEFAULT_BASE_URL, DEFAULT_HISTORY_SLOT,
};
use serde::{Deserialize, Serialize};

pub const LOG_FILE: &str = "./matchtrack.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Holds the history slot.
    pub data_dir: PathBuf,
    /// Downloaded result files land here.
    pub output_dir: PathBuf,
    pub thresholds: Option<Thresholds>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from(".matchtrack"),
            output_dir: PathBuf::from("output"),
            thresholds: None,
        }
    }
}

impl AppConfig {
    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(content)?;
        if let Some(t) = config.thresholds {
            // Deserialization bypasses the range check.
            Thresholds::new(t.min_company_ratio.into(), t.min_address_ratio.into())?;
        }
        Ok(config)
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.base_url = url;
        }
        self
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.base_url.clone(),
            ..ServiceSettings::default()
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            output_dir: self.output_dir.clone(),
            default_thresholds: self.thresholds,
        }
    }

    pub fn history_storage(&self) -> FileHistoryStorage {
        FileHistoryStorage::new(self.data_dir.clone(), DEFAULT_HISTORY_SLOT)
    }
}
