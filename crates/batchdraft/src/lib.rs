//! Spreadsheet-style product drafting with a paced bulk upload to a
//! creation API that only accepts one product per request.

pub mod client;
pub mod config;
pub mod draft;
pub mod error;
pub mod images;
pub mod logging;
pub mod secrets;
pub mod template;
pub mod upload;
pub mod validation;

pub use client::{CreateProductRequest, CreatedProduct, HttpProductClient, ProductCreator};
pub use config::{load_config, BulkUploadConfig, UploadSettings};
pub use draft::{
    DraftField, DraftRecord, EditOutcome, ImageRef, ProductType, RowStatus, RowStore,
    SharedRowStore,
};
pub use error::{
    BatchDraftError, CatalogError, ConfigError, DispatchError, Result, RunError, TemplateError,
    ValidationError,
};
pub use images::{CachedImageCatalog, CatalogImage, HttpImageCatalog, ImageCatalog};
pub use logging::{init_logging, LogFormat};
pub use template::{export_template, import_rows};
pub use upload::{CancelHandle, RunSummary, UploadOrchestrator, UploadProgressBroadcaster};
pub use validation::{is_candidate, validate};
