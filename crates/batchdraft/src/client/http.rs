//! REST client for the product creation endpoint.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::request::{CreateProductRequest, CreatedProduct};
use super::ProductCreator;
use crate::config::BulkUploadConfig;
use crate::error::DispatchError;

const PRODUCTS_PATH: &str = "/wp-json/wc/v3/products";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in a row message.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Error body returned by the API on a rejected request.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpProductClient {
    client: Client,
    endpoint: String,
    consumer_key: SecretString,
    consumer_secret: SecretString,
}

impl HttpProductClient {
    pub fn new(
        base_url: &str,
        consumer_key: SecretString,
        consumer_secret: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint_url(base_url),
            consumer_key,
            consumer_secret,
        })
    }

    /// Builds a client from config, resolving both credentials.
    pub fn from_config(config: &BulkUploadConfig) -> crate::Result<Self> {
        let key = config.consumer_key.resolve("consumer key")?;
        let secret = config.consumer_secret.resolve("consumer secret")?;
        Ok(Self::new(
            &config.base_url,
            key,
            secret,
            config.request_timeout(),
        )?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim().trim_end_matches('/'), PRODUCTS_PATH)
}

/// Turns a non-2xx response body into a rejection, preferring the API's own
/// `message` field.
fn rejection_from_body(status: StatusCode, body: &str) -> DispatchError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.len() > MAX_ERROR_BODY_LENGTH {
                let cut = (0..=MAX_ERROR_BODY_LENGTH)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                format!("{}... (truncated)", &body[..cut])
            } else {
                body.to_string()
            }
        });

    DispatchError::Rejected {
        status: Some(status.as_u16()),
        message,
    }
}

/// Classifies a non-2xx response. A body that could not be read at all is a
/// decode failure rather than a rejection with an empty message.
fn failure_from_response<E: std::fmt::Display>(
    status: StatusCode,
    body: Result<String, E>,
) -> DispatchError {
    match body {
        Ok(body) => rejection_from_body(status, &body),
        Err(e) => {
            warn!("HTTP {} response body could not be read: {}", status, e);
            DispatchError::Decode(format!("HTTP {}: {}", status.as_u16(), e))
        }
    }
}

#[async_trait]
impl ProductCreator for HttpProductClient {
    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<CreatedProduct, DispatchError> {
        debug!("POST {} sku={}", self.endpoint, request.sku);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(
                self.consumer_key.expose_secret(),
                Some(self.consumer_secret.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_response(status, response.text().await));
        }

        // The product exists once we get a 2xx, even if the body is odd.
        match response.json::<CreatedProduct>().await {
            Ok(created) => Ok(created),
            Err(e) => {
                warn!(
                    "Product {} created but response could not be parsed: {}",
                    request.sku, e
                );
                Ok(CreatedProduct::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftRecord;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("https://shop.example.com/"),
            "https://shop.example.com/wp-json/wc/v3/products"
        );
        assert_eq!(
            endpoint_url(" http://localhost:8080 "),
            "http://localhost:8080/wp-json/wc/v3/products"
        );
    }

    #[test]
    fn test_rejection_prefers_api_message() {
        let body = r#"{"code":"product_invalid_sku","message":"Invalid or duplicated SKU.","data":{"status":400}}"#;
        let err = rejection_from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err,
            DispatchError::Rejected {
                status: Some(400),
                message: "Invalid or duplicated SKU.".to_string(),
            }
        );
    }

    #[test]
    fn test_rejection_without_json_body() {
        let err = rejection_from_body(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.row_message(), crate::error::GENERIC_DISPATCH_FAILURE);

        let long = "x".repeat(500);
        let err = rejection_from_body(StatusCode::INTERNAL_SERVER_ERROR, &long);
        assert!(err.row_message().ends_with("... (truncated)"));
    }

    #[test]
    fn test_unreadable_error_body_is_decode_failure() {
        let err = failure_from_response::<String>(
            StatusCode::BAD_REQUEST,
            Err("connection closed before message completed".to_string()),
        );
        assert!(matches!(err, DispatchError::Decode(_)));
        assert_eq!(err.row_message(), crate::error::GENERIC_DISPATCH_FAILURE);

        let err = failure_from_response::<String>(
            StatusCode::CONFLICT,
            Ok(r#"{"message":"SKU already exists"}"#.to_string()),
        );
        assert_eq!(err.row_message(), "SKU already exists");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = HttpProductClient::new(
            "http://127.0.0.1:1",
            SecretString::from("ck".to_string()),
            SecretString::from("cs".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();

        let request = CreateProductRequest::from_record(&DraftRecord::empty());
        let result = client.create_product(&request).await;
        assert!(matches!(result, Err(DispatchError::Transport(_))));
    }
}
