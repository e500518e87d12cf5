use std::path::Path;

use crate::config::schema::BulkUploadConfig;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BulkUploadConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = load_config_from_str(&content)?;
    log::debug!("Loaded upload config from {}", path.display());
    Ok(config)
}

pub fn load_config_from_str(content: &str) -> Result<BulkUploadConfig, ConfigError> {
    let config: BulkUploadConfig = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

fn validate_config(config: &BulkUploadConfig) -> Result<(), ConfigError> {
    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        return Err(invalid("baseUrl must not be empty"));
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(invalid(format!(
            "baseUrl must start with http:// or https://, got '{}'",
            base_url
        )));
    }

    if !config.backoff_multiplier.is_finite() || config.backoff_multiplier < 1.0 {
        return Err(invalid(format!(
            "backoffMultiplier must be a finite number >= 1.0, got {}",
            config.backoff_multiplier
        )));
    }

    if config.max_delay_ms < config.inter_item_delay_ms {
        return Err(invalid(format!(
            "maxDelayMs ({}) must not be smaller than interItemDelayMs ({})",
            config.max_delay_ms, config.inter_item_delay_ms
        )));
    }

    if config.initial_rows == 0 {
        return Err(invalid("initialRows must be at least 1"));
    }

    if config.request_timeout_secs == 0 {
        return Err(invalid("requestTimeoutSecs must be at least 1"));
    }

    if config.progress_capacity == 0 {
        return Err(invalid("progressCapacity must be at least 1"));
    }

    Ok(())
}
