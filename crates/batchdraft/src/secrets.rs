//! API credential resolution.
//!
//! A credential may be given inline, as a path to a file holding it, or as the
//! name of an environment variable. The first non-empty source wins, in that
//! order.

use std::fs;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No source configured for credential '{label}'")]
    NoSourceProvided { label: String },

    #[error("Failed to read credential from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Where to find one credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
}

impl CredentialSource {
    pub fn is_configured(&self) -> bool {
        [&self.value, &self.file, &self.env_var]
            .iter()
            .any(|s| s.as_deref().is_some_and(|v| !v.is_empty()))
    }

    /// Resolves the credential. `label` only appears in error messages.
    pub fn resolve(&self, label: &str) -> Result<SecretString> {
        if let Some(value) = self.value.as_deref().filter(|v| !v.is_empty()) {
            return Ok(SecretString::from(value.to_string()));
        }

        if let Some(path) = self.file.as_deref().filter(|p| !p.is_empty()) {
            let expanded = expand_home(path);
            return fs::read_to_string(&expanded)
                .map(|content| SecretString::from(content.trim().to_string()))
                .map_err(|source| SecretError::FileReadError {
                    path: expanded,
                    source,
                });
        }

        if let Some(name) = self.env_var.as_deref().filter(|n| !n.is_empty()) {
            return match std::env::var(name) {
                Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
                Ok(_) | Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided {
            label: label.to_string(),
        })
    }
}

fn expand_home(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home.trim_end_matches('/'), rest),
            Err(_) => path.to_string(),
        },
        None => path.to_string(),
    }
}
