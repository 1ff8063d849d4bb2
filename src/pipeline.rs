//! Batch image ingestion: fetch, thumbnail, and store product images.
//!
//! The first URL is the main image: it is stored as an original and, when it
//! decodes, as a 500x500 thumbnail. Every other URL is stored as an original
//! only. Per-image failures are reported in the results and never abort the
//! rest of the batch.

use crate::fetch::{HttpImageFetcher, ImageFetcher};
use crate::image::{ThumbnailProcessor, ThumbnailService};
use crate::models::{Config, DownloadOutcome, FetchedImage, IngestResponse, UploadOutcome};
use crate::naming::{self, Variant};
use crate::request::IngestRequest;
use crate::storage::{MockStorage, ObjectStorage, S3Storage};
use crate::{Error, Result};
use futures::future::join_all;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Runs ingestion requests against injected fetch, storage, and thumbnail
/// collaborators.
pub struct Pipeline {
    fetcher: Box<dyn ImageFetcher>,
    storage: Box<dyn ObjectStorage>,
    thumbnails: Box<dyn ThumbnailService>,
}

/// Injectable service bundle used to construct [`Pipeline`] in tests/harnesses.
pub struct PipelineServices {
    pub fetcher: Box<dyn ImageFetcher>,
    pub storage: Box<dyn ObjectStorage>,
    pub thumbnails: Box<dyn ThumbnailService>,
}

/// What the main image produced.
struct MainImage {
    thumbnail: Option<UploadOutcome>,
    original: UploadOutcome,
}

impl Pipeline {
    pub fn with_services(services: PipelineServices) -> Self {
        Self {
            fetcher: services.fetcher,
            storage: services.storage,
            thumbnails: services.thumbnails,
        }
    }

    /// Construct a pipeline from environment configuration (`Config::from_env`).
    pub async fn new() -> Result<Self> {
        let config = Config::from_env()?;
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage: Box<dyn ObjectStorage> = if config.dry_run {
            info!("DRY_RUN enabled: images will be kept in memory only");
            Box::new(MockStorage::new().with_base_url(config.storage_public_base_url.clone()))
        } else {
            info!(
                "Storing images in bucket {} at {}",
                config.storage_bucket, config.storage_endpoint
            );
            Box::new(S3Storage::from_config(config).await?)
        };

        Ok(Self::with_services(PipelineServices {
            fetcher: Box::new(HttpImageFetcher::new(Duration::from_secs(
                config.fetch_timeout_secs,
            ))),
            storage,
            thumbnails: Box::new(ThumbnailProcessor::new()),
        }))
    }

    /// Validate an untyped payload and ingest it.
    pub async fn handle(&self, payload: Value) -> Result<IngestResponse> {
        let request = IngestRequest::from_value(payload)?;
        self.ingest(&request).await
    }

    pub async fn ingest(&self, request: &IngestRequest) -> Result<IngestResponse> {
        let (main_url, additional_urls) = request
            .urls
            .split_first()
            .ok_or_else(|| Error::InvalidArgument("No valid image URLs provided".to_string()))?;
        let folder = naming::folder_for_product(request.product_name.as_deref());

        info!(
            "Ingesting {} image(s) into folder '{}'",
            request.urls.len(),
            folder
        );

        let (main, additional) = tokio::join!(
            self.process_main(main_url, &folder),
            self.process_additional(additional_urls, &folder)
        );

        if additional_urls.is_empty() {
            if let UploadOutcome::Failed { source_url, error } = &main.original {
                error!("Sole image {} could not be stored: {}", source_url, error);
                return Err(Error::Internal(format!(
                    "Failed to process image {}: {}",
                    source_url, error
                )));
            }
        }

        let main_image_url = main
            .original
            .new_url()
            .or_else(|| additional.iter().find_map(UploadOutcome::new_url))
            .map(str::to_string);
        let thumbnail_url = main
            .thumbnail
            .as_ref()
            .and_then(UploadOutcome::new_url)
            .map(str::to_string)
            .or_else(|| main_image_url.clone());

        let mut results = Vec::with_capacity(request.urls.len() + 1);
        results.extend(main.thumbnail);
        results.push(main.original);
        results.extend(additional);

        let response = IngestResponse::new(
            results,
            main_image_url,
            thumbnail_url,
            request.urls.len(),
        );
        info!(
            "Ingestion finished: {}/{} uploads succeeded",
            response.success_count,
            response.results.len()
        );

        Ok(response)
    }

    async fn process_main(&self, url: &str, folder: &str) -> MainImage {
        let image = match self.download(url).await.into_image() {
            Ok(image) => image,
            Err(failed) => {
                return MainImage {
                    thumbnail: None,
                    original: failed,
                };
            }
        };

        let original = self.store(&image, Variant::Original, folder).await;
        if !original.is_success() {
            return MainImage {
                thumbnail: None,
                original,
            };
        }
        let thumbnail = self.store_thumbnail(&image, folder).await;

        MainImage {
            thumbnail,
            original,
        }
    }

    /// A resize failure yields no entry; a failed write is reported as one.
    async fn store_thumbnail(&self, image: &FetchedImage, folder: &str) -> Option<UploadOutcome> {
        let thumbnail = match self.thumbnails.thumbnail(&image.bytes).await {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                warn!(
                    "Could not resize {}, using original as thumbnail: {}",
                    image.source_url, e
                );
                return None;
            }
        };
        debug!(
            "Resized {} to {}x{} ({} bytes)",
            image.source_url,
            thumbnail.width,
            thumbnail.height,
            thumbnail.bytes.len()
        );

        let resized = FetchedImage {
            bytes: thumbnail.bytes,
            content_type: thumbnail.content_type,
            source_url: image.source_url.clone(),
        };
        Some(self.store(&resized, Variant::Thumbnail, folder).await)
    }

    async fn process_additional(&self, urls: &[String], folder: &str) -> Vec<UploadOutcome> {
        join_all(urls.iter().map(|url| async move {
            match self.download(url).await.into_image() {
                Ok(image) => self.store(&image, Variant::Additional, folder).await,
                Err(failed) => failed,
            }
        }))
        .await
    }

    async fn download(&self, url: &str) -> DownloadOutcome {
        match self.fetcher.fetch(url).await {
            Ok(image) => {
                debug!("Downloaded {} ({} bytes)", url, image.bytes.len());
                DownloadOutcome::Fetched(image)
            }
            Err(e) => {
                error!("Failed to download {}: {}", url, e);
                DownloadOutcome::Failed {
                    source_url: url.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn store(&self, image: &FetchedImage, variant: Variant, folder: &str) -> UploadOutcome {
        let extension = naming::extension_for_content_type(&image.content_type);
        let path = naming::blob_path(folder, variant, extension);

        match self.upload(&path, image).await {
            Ok(new_url) => {
                info!("Stored {} as {}", image.source_url, path);
                UploadOutcome::Stored {
                    source_url: image.source_url.clone(),
                    new_url,
                    storage_path: path,
                }
            }
            Err(e) => {
                error!("Failed to store {} at {}: {}", image.source_url, path, e);
                UploadOutcome::Failed {
                    source_url: image.source_url.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn upload(&self, path: &str, image: &FetchedImage) -> Result<String> {
        self.storage
            .put(path, &image.bytes, &image.content_type)
            .await?;
        self.storage.public_url(path).await
    }
}
