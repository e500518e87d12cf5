//! Process-wide logging setup.
//!
//! Library code logs through the `log` facade; this installs a
//! `tracing-subscriber` formatter and forwards `log` records into it.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Installs the global subscriber. `default_filter` applies when `RUST_LOG`
/// is unset. Returns `false` if a subscriber was already installed.
pub fn init_logging(default_filter: &str, format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = match format {
        LogFormat::Text => {
            let subscriber = fmt().with_env_filter(filter).with_target(true).finish();
            tracing::subscriber::set_global_default(subscriber).is_ok()
        }
        LogFormat::Json => {
            let subscriber = fmt()
                .json()
                .with_env_filter(filter)
                .with_current_span(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber).is_ok()
        }
    };
    if !installed {
        return false;
    }

    tracing_log::LogTracer::init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let _ = init_logging("batchdraft=debug", LogFormat::Text);
        assert!(!init_logging("info", LogFormat::Json));
        log::info!("logging bridged");
    }

    #[test]
    fn test_format_names() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
