use std::path::PathBuf;
use thiserror::Error;

/// Message recorded on a row when the collaborator gives no usable reason.
pub const GENERIC_DISPATCH_FAILURE: &str = "upload failed";

#[derive(Error, Debug)]
pub enum BatchDraftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Run error: {0}")]
    Run(#[from] RunError),

    #[error("Credential error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Image catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A draft failed one of the required-field or type rules.
///
/// The `Display` text is exactly what gets attached to the row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,

    #[error("price is required")]
    MissingPrice,

    #[error("sku is required")]
    MissingSku,

    #[error("description is required")]
    MissingDescription,

    #[error("short description is required")]
    MissingShortDescription,

    #[error("price must be a valid number")]
    InvalidPrice,
}

/// The Create collaborator refused a request or the call never completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    /// The response arrived but could not be read, e.g. an error body cut
    /// off mid-stream. Rows get the generic fallback message.
    #[error("unreadable response: {0}")]
    Decode(String),
}

impl DispatchError {
    /// Text stored on the row: the collaborator's own message when it sent
    /// one, otherwise the generic fallback.
    pub fn row_message(&self) -> String {
        match self {
            DispatchError::Rejected { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            DispatchError::Transport(detail) if !detail.trim().is_empty() => detail.clone(),
            _ => GENERIC_DISPATCH_FAILURE.to_string(),
        }
    }
}

/// Run-level failures. These are never attached to a row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("no valid rows to upload")]
    NoValidRows,

    #[error("an upload run is already in progress")]
    AlreadyRunning,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Media request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Media endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("Unreadable media listing: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Unexpected template header: expected '{expected}', found '{found}'")]
    HeaderMismatch { expected: String, found: String },

    #[error("Failed to flush template writer: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BatchDraftError>;
