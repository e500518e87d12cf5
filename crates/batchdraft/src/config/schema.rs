use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::draft::DEFAULT_ROW_COUNT;
use crate::logging::LogFormat;
use crate::secrets::CredentialSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadConfig {
    /// Store root, e.g. `https://shop.example.com`.
    pub base_url: String,
    #[serde(default)]
    pub consumer_key: CredentialSource,
    #[serde(default)]
    pub consumer_secret: CredentialSource,
    #[serde(default = "default_inter_item_delay_ms")]
    pub inter_item_delay_ms: u64,
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_initial_rows")]
    pub initial_rows: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_progress_capacity")]
    pub progress_capacity: usize,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_inter_item_delay_ms() -> u64 {
    1000
}

fn default_completion_delay_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_initial_rows() -> usize {
    DEFAULT_ROW_COUNT
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_progress_capacity() -> usize {
    100
}

impl BulkUploadConfig {
    /// Config with every tunable at its default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            consumer_key: CredentialSource::default(),
            consumer_secret: CredentialSource::default(),
            inter_item_delay_ms: default_inter_item_delay_ms(),
            completion_delay_ms: default_completion_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            initial_rows: default_initial_rows(),
            request_timeout_secs: default_request_timeout_secs(),
            progress_capacity: default_progress_capacity(),
            log_format: LogFormat::default(),
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            inter_item_delay: Duration::from_millis(self.inter_item_delay_ms),
            completion_delay: Duration::from_millis(self.completion_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
            initial_rows: self.initial_rows,
            progress_capacity: self.progress_capacity,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Orchestrator tunables derived from [`BulkUploadConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSettings {
    /// Pause between two candidates.
    pub inter_item_delay: Duration,
    /// Pause between an all-succeeded run and the grid reset.
    pub completion_delay: Duration,
    /// Factor applied to the pause after each consecutive dispatch failure.
    pub backoff_multiplier: f64,
    /// Upper bound for the backed-off pause.
    pub max_delay: Duration,
    /// Rows created by the post-run reset.
    pub initial_rows: usize,
    pub progress_capacity: usize,
}

impl UploadSettings {
    /// No waiting at all; handy for tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            inter_item_delay: Duration::ZERO,
            completion_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            inter_item_delay: Duration::from_millis(default_inter_item_delay_ms()),
            completion_delay: Duration::from_millis(default_completion_delay_ms()),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay: Duration::from_millis(default_max_delay_ms()),
            initial_rows: default_initial_rows(),
            progress_capacity: default_progress_capacity(),
        }
    }
}
