//! Data models and structures
//!
//! Defines the per-image outcomes, the aggregated ingestion response, and the
//! environment-driven configuration.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Raw bytes fetched from a remote image URL.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub source_url: String,
}

/// Result of fetching one image reference.
#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    Fetched(FetchedImage),
    Failed { source_url: String, error: String },
}

impl DownloadOutcome {
    pub fn source_url(&self) -> &str {
        match self {
            DownloadOutcome::Fetched(image) => &image.source_url,
            DownloadOutcome::Failed { source_url, .. } => source_url,
        }
    }

    /// Hands back the fetched image, or the failed entry to report in its place.
    pub fn into_image(self) -> std::result::Result<FetchedImage, UploadOutcome> {
        match self {
            DownloadOutcome::Fetched(image) => Ok(image),
            DownloadOutcome::Failed { source_url, error } => {
                Err(UploadOutcome::Failed { source_url, error })
            }
        }
    }
}

/// Result of storing one image variant. This is what callers see in `results`.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Stored {
        source_url: String,
        new_url: String,
        storage_path: String,
    },
    Failed {
        source_url: String,
        error: String,
    },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Stored { .. })
    }

    pub fn source_url(&self) -> &str {
        match self {
            UploadOutcome::Stored { source_url, .. } | UploadOutcome::Failed { source_url, .. } => {
                source_url
            }
        }
    }

    pub fn new_url(&self) -> Option<&str> {
        match self {
            UploadOutcome::Stored { new_url, .. } => Some(new_url),
            UploadOutcome::Failed { .. } => None,
        }
    }

    pub fn storage_path(&self) -> Option<&str> {
        match self {
            UploadOutcome::Stored { storage_path, .. } => Some(storage_path),
            UploadOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UploadOutcome::Stored { .. } => None,
            UploadOutcome::Failed { error, .. } => Some(error),
        }
    }
}

// Flattened `{ success, originalUrl, newUrl?, storagePath?, error? }` shape.
impl Serialize for UploadOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            UploadOutcome::Stored {
                source_url,
                new_url,
                storage_path,
            } => {
                let mut state = serializer.serialize_struct("UploadOutcome", 4)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("originalUrl", source_url)?;
                state.serialize_field("newUrl", new_url)?;
                state.serialize_field("storagePath", storage_path)?;
                state.end()
            }
            UploadOutcome::Failed { source_url, error } => {
                let mut state = serializer.serialize_struct("UploadOutcome", 3)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("originalUrl", source_url)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

/// Aggregate response for one ingestion request.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub success: bool,
    /// Alias for `thumbnail_url`.
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub main_image_url: Option<String>,
    pub results: Vec<UploadOutcome>,
    pub total_processed: usize,
    pub success_count: usize,
}

impl IngestResponse {
    pub fn new(
        results: Vec<UploadOutcome>,
        main_image_url: Option<String>,
        thumbnail_url: Option<String>,
        total_processed: usize,
    ) -> Self {
        let success_count = results.iter().filter(|r| r.is_success()).count();

        Self {
            success: success_count > 0,
            url: thumbnail_url.clone(),
            thumbnail_url,
            main_image_url,
            results,
            total_processed,
            success_count,
        }
    }
}

// Configuration
const DEFAULT_STORAGE_ENDPOINT: &str = "https://s3.amazonaws.com";
const DEFAULT_STORAGE_REGION: &str = "us-east-1";
const DEFAULT_STORAGE_BUCKET: &str = "product-images";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_access_key_id: Option<String>,
    pub storage_secret_access_key: Option<String>,
    pub storage_endpoint: String,
    pub storage_region: String,
    pub storage_bucket: String,
    pub storage_public_base_url: String,
    pub fetch_timeout_secs: u64,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dry_run = lookup("DRY_RUN")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let storage_access_key_id = lookup("STORAGE_ACCESS_KEY_ID");
        let storage_secret_access_key = lookup("STORAGE_SECRET_ACCESS_KEY");
        if !dry_run {
            if storage_access_key_id.is_none() {
                return Err(crate::Error::Config(
                    "STORAGE_ACCESS_KEY_ID not set".to_string(),
                ));
            }
            if storage_secret_access_key.is_none() {
                return Err(crate::Error::Config(
                    "STORAGE_SECRET_ACCESS_KEY not set".to_string(),
                ));
            }
        }

        let storage_endpoint =
            lookup("STORAGE_ENDPOINT").unwrap_or_else(|| DEFAULT_STORAGE_ENDPOINT.to_string());
        let storage_bucket =
            lookup("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string());
        let storage_public_base_url = lookup("STORAGE_PUBLIC_BASE_URL").unwrap_or_else(|| {
            format!("{}/{}", storage_endpoint.trim_end_matches('/'), storage_bucket)
        });

        let fetch_timeout_secs = match lookup("FETCH_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                crate::Error::Config(format!("FETCH_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Self {
            storage_access_key_id,
            storage_secret_access_key,
            storage_endpoint,
            storage_region: lookup("STORAGE_REGION")
                .unwrap_or_else(|| DEFAULT_STORAGE_REGION.to_string()),
            storage_bucket,
            storage_public_base_url,
            fetch_timeout_secs,
            dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_stored_outcome_serialization() {
        let outcome = UploadOutcome::Stored {
            source_url: "https://example.com/a.png".to_string(),
            new_url: "https://cdn.test/watches/original_1_x.png".to_string(),
            storage_path: "watches/original_1_x.png".to_string(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "originalUrl": "https://example.com/a.png",
                "newUrl": "https://cdn.test/watches/original_1_x.png",
                "storagePath": "watches/original_1_x.png",
            })
        );
    }

    #[test]
    fn test_failed_outcome_serialization_omits_urls() {
        let outcome = UploadOutcome::Failed {
            source_url: "https://example.com/b.png".to_string(),
            error: "Download failed: HTTP 404".to_string(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Download failed: HTTP 404");
        assert!(json.get("newUrl").is_none());
        assert!(json.get("storagePath").is_none());
    }

    #[test]
    fn test_failed_download_converts_to_failed_upload() {
        let outcome = DownloadOutcome::Failed {
            source_url: "https://example.com/c.png".to_string(),
            error: "timeout".to_string(),
        };
        assert_eq!(outcome.source_url(), "https://example.com/c.png");

        let upload = outcome.into_image().unwrap_err();
        assert!(!upload.is_success());
        assert_eq!(upload.source_url(), "https://example.com/c.png");
        assert_eq!(upload.error(), Some("timeout"));
    }

    #[test]
    fn test_response_counts_and_alias() {
        let results = vec![
            UploadOutcome::Stored {
                source_url: "a".to_string(),
                new_url: "https://cdn.test/a".to_string(),
                storage_path: "p/a".to_string(),
            },
            UploadOutcome::Failed {
                source_url: "b".to_string(),
                error: "nope".to_string(),
            },
        ];

        let response = IngestResponse::new(
            results,
            Some("https://cdn.test/a".to_string()),
            Some("https://cdn.test/a".to_string()),
            2,
        );

        assert!(response.success);
        assert_eq!(response.success_count, 1);
        assert_eq!(response.url, response.thumbnail_url);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalProcessed"], 2);
        assert_eq!(json["successCount"], 1);
        assert_eq!(json["mainImageUrl"], "https://cdn.test/a");
    }

    #[test]
    fn test_response_without_successes() {
        let response = IngestResponse::new(Vec::new(), None, None, 0);
        assert!(!response.success);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["thumbnailUrl"].is_null());
        assert!(json["url"].is_null());
    }

    #[test]
    fn test_config_requires_credentials() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("STORAGE_ACCESS_KEY_ID"));
    }

    #[test]
    fn test_config_dry_run_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DRY_RUN", "true")])).unwrap();

        assert!(config.dry_run);
        assert_eq!(config.storage_bucket, "product-images");
        assert_eq!(
            config.storage_public_base_url,
            "https://s3.amazonaws.com/product-images"
        );
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORAGE_ACCESS_KEY_ID", "key"),
            ("STORAGE_SECRET_ACCESS_KEY", "secret"),
            ("STORAGE_ENDPOINT", "https://nyc3.digitaloceanspaces.com/"),
            ("STORAGE_BUCKET", "watches"),
            ("FETCH_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert!(!config.dry_run);
        assert_eq!(
            config.storage_public_base_url,
            "https://nyc3.digitaloceanspaces.com/watches"
        );
        assert_eq!(config.fetch_timeout_secs, 5);
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("DRY_RUN", "1"),
            ("FETCH_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FETCH_TIMEOUT_SECS"));
    }
}
