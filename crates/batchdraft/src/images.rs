//! Pre-uploaded image catalog used to fill the image column.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::BulkUploadConfig;
use crate::draft::ImageRef;
use crate::error::CatalogError;

const MEDIA_PATH: &str = "/wp-json/wp/v2/media";
const MEDIA_PAGE_SIZE: u32 = 100;
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";
/// Upper bound on pages fetched in one listing.
const MAX_MEDIA_PAGES: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogImage {
    pub id: u64,
    pub url: String,
    pub title: String,
}

impl CatalogImage {
    pub fn as_image_ref(&self) -> ImageRef {
        ImageRef::Url(self.url.clone())
    }
}

#[async_trait]
pub trait ImageCatalog: Send + Sync {
    async fn list_images(&self) -> Result<Vec<CatalogImage>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct MediaTitle {
    #[serde(default)]
    rendered: String,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    id: u64,
    source_url: String,
    #[serde(default)]
    title: Option<MediaTitle>,
}

impl From<MediaItem> for CatalogImage {
    fn from(item: MediaItem) -> Self {
        Self {
            id: item.id,
            url: item.source_url,
            title: item.title.map(|t| t.rendered).unwrap_or_default(),
        }
    }
}

fn parse_media(body: &str) -> Result<Vec<CatalogImage>, CatalogError> {
    let items: Vec<MediaItem> = serde_json::from_str(body)?;
    Ok(items.into_iter().map(CatalogImage::from).collect())
}

/// Page count advertised by the listing. Missing or garbled means one page.
fn total_pages(headers: &HeaderMap) -> u32 {
    let advertised = headers
        .get(TOTAL_PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(1);
    if advertised > MAX_MEDIA_PAGES {
        log::warn!(
            "Media listing has {} pages, only the first {} are loaded",
            advertised,
            MAX_MEDIA_PAGES
        );
    }
    advertised.clamp(1, MAX_MEDIA_PAGES)
}

/// Lists every image from the media endpoint, page by page.
pub struct HttpImageCatalog {
    client: Client,
    endpoint: String,
    credentials: Option<(SecretString, SecretString)>,
}

impl HttpImageCatalog {
    pub fn new(
        base_url: &str,
        credentials: Option<(SecretString, SecretString)>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}{}", base_url.trim().trim_end_matches('/'), MEDIA_PATH),
            credentials,
        })
    }

    /// Builds a catalog from config. Credentials are optional here: media
    /// listings are usually public.
    pub fn from_config(config: &BulkUploadConfig) -> crate::Result<Self> {
        let credentials =
            if config.consumer_key.is_configured() && config.consumer_secret.is_configured() {
                Some((
                    config.consumer_key.resolve("consumer key")?,
                    config.consumer_secret.resolve("consumer secret")?,
                ))
            } else {
                None
            };
        Ok(Self::new(
            &config.base_url,
            credentials,
            config.request_timeout(),
        )?)
    }

    /// Fetches one page. Returns its images and the advertised page count.
    async fn fetch_page(&self, page: u32) -> Result<(Vec<CatalogImage>, u32), CatalogError> {
        let mut request = self.client.get(&self.endpoint).query(&[
            ("media_type", "image".to_string()),
            ("per_page", MEDIA_PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ]);
        if let Some((key, secret)) = &self.credentials {
            request = request.basic_auth(key.expose_secret(), Some(secret.expose_secret()));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let pages = total_pages(response.headers());
        let body = response.text().await?;
        Ok((parse_media(&body)?, pages))
    }
}

#[async_trait]
impl ImageCatalog for HttpImageCatalog {
    async fn list_images(&self) -> Result<Vec<CatalogImage>, CatalogError> {
        let (mut images, pages) = self.fetch_page(1).await?;
        for page in 2..=pages {
            let (more, _) = self.fetch_page(page).await?;
            images.extend(more);
        }
        log::info!("Loaded {} catalog images from {} page(s)", images.len(), pages);
        Ok(images)
    }
}

/// Wraps a catalog so the inner one is queried at most once.
///
/// A failed first query is not cached; the next call tries again.
pub struct CachedImageCatalog<C> {
    inner: C,
    cache: OnceCell<Vec<CatalogImage>>,
}

impl<C: ImageCatalog> CachedImageCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: OnceCell::new(),
        }
    }
}

#[async_trait]
impl<C: ImageCatalog> ImageCatalog for CachedImageCatalog<C> {
    async fn list_images(&self) -> Result<Vec<CatalogImage>, CatalogError> {
        self.cache
            .get_or_try_init(|| self.inner.list_images())
            .await
            .cloned()
    }
}
