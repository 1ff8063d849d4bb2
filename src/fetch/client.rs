use super::ImageFetcher;
use crate::mime::detect_image_mime;
use crate::models::FetchedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

pub struct HttpImageFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self::new_with_client(Client::new(), timeout)
    }

    pub fn new_with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

/// Prefer a declared `image/*` type; otherwise sniff the bytes.
fn resolve_content_type(header: Option<&str>, bytes: &[u8]) -> String {
    let declared = header
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| value.starts_with("image/"));

    declared.unwrap_or_else(|| {
        detect_image_mime(bytes)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string()
    })
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        tracing::debug!("Fetching image {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, IMAGE_ACCEPT)
            .send()
            .await
            .map_err(|e| Error::Download(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!("HTTP {} fetching {}", status, url)));
        }

        let header = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("Failed to read body of {}: {}", url, e)))?
            .to_vec();

        let content_type = resolve_content_type(header.as_deref(), &bytes);
        tracing::debug!("Fetched {} ({} bytes, {})", url, bytes.len(), content_type);

        Ok(FetchedImage {
            bytes,
            content_type,
            source_url: url.to_string(),
        })
    }
}
