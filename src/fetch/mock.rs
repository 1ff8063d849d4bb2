use super::ImageFetcher;
use crate::models::FetchedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum MockResponse {
    Image { bytes: Vec<u8>, content_type: String },
    Failure(String),
}

/// In-memory fetcher keyed by URL. Unknown URLs fail as a 404.
#[derive(Clone, Default)]
pub struct MockImageFetcher {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, url: &str, bytes: Vec<u8>, content_type: &str) -> Self {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            MockResponse::Image {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        self
    }

    pub fn with_failure(self, url: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), MockResponse::Failure(message.to_string()));
        self
    }

    pub fn get_fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub fn get_fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        self.fetched.lock().unwrap().push(url.to_string());

        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(MockResponse::Image {
                bytes,
                content_type,
            }) => Ok(FetchedImage {
                bytes,
                content_type,
                source_url: url.to_string(),
            }),
            Some(MockResponse::Failure(message)) => Err(Error::Download(message)),
            None => Err(Error::Download(format!("HTTP 404 Not Found fetching {}", url))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_returns_configured_image() {
        let fetcher =
            MockImageFetcher::new().with_image("https://a.test/1.png", vec![1, 2], "image/png");

        let image = fetcher.fetch("https://a.test/1.png").await.unwrap();
        assert_eq!(image.bytes, vec![1, 2]);
        assert_eq!(image.content_type, "image/png");
        assert_eq!(fetcher.get_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_fetcher_failures() {
        let fetcher = MockImageFetcher::new().with_failure("https://a.test/bad.png", "timed out");

        let err = fetcher.fetch("https://a.test/bad.png").await.unwrap_err();
        assert_eq!(err.to_string(), "Download failed: timed out");

        let err = fetcher.fetch("https://a.test/unknown.png").await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(
            fetcher.get_fetched_urls(),
            vec![
                "https://a.test/bad.png".to_string(),
                "https://a.test/unknown.png".to_string()
            ]
        );
    }
}
