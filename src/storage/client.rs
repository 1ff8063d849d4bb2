use super::ObjectStorage;
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, types::ObjectCannedAcl, Client as S3Client};

const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub async fn new(
        access_key_id: String,
        secret_access_key: String,
        endpoint: String,
        region: String,
        bucket: String,
        public_base_url: String,
    ) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "product-image-ingest",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region))
            .endpoint_url(endpoint)
            .load()
            .await;

        // Path-style keeps `<endpoint>/<bucket>/<key>` valid for non-AWS hosts.
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(config),
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let access_key_id = config
            .storage_access_key_id
            .clone()
            .ok_or_else(|| Error::Config("STORAGE_ACCESS_KEY_ID not set".to_string()))?;
        let secret_access_key = config
            .storage_secret_access_key
            .clone()
            .ok_or_else(|| Error::Config("STORAGE_SECRET_ACCESS_KEY not set".to_string()))?;

        Ok(Self::new(
            access_key_id,
            secret_access_key,
            config.storage_endpoint.clone(),
            config.storage_region.clone(),
            config.storage_bucket.clone(),
            config.storage_public_base_url.clone(),
        )
        .await)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(&self, path: &str, data: &[u8], content_type: &str) -> Result<()> {
        let body = ByteStream::from(data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(body)
            .content_type(content_type)
            .cache_control(CACHE_CONTROL)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("Failed to write {}: {}", path, e)))?;

        Ok(())
    }

    /// Objects are written public-read, so the plain URL never expires.
    async fn public_url(&self, path: &str) -> Result<String> {
        Ok(format!("{}/{}", self.public_base_url, path))
    }
}
