//! The product creation collaborator.
//!
//! The remote API has no batch endpoint, so the orchestrator issues one
//! [`ProductCreator::create_product`] call per row.

pub mod http;
pub mod request;

use async_trait::async_trait;

use crate::error::DispatchError;

pub use http::HttpProductClient;
pub use request::{CategoryRef, CreateProductRequest, CreatedProduct, ImageSource, MetaEntry};

#[async_trait]
pub trait ProductCreator: Send + Sync {
    /// Creates one product. A failed response or transport error is returned
    /// as `DispatchError`; it is never retried here.
    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<CreatedProduct, DispatchError>;
}
