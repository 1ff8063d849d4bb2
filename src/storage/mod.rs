//! Object storage for ingested images
//!
//! Writes image bytes to S3-compatible storage under a caller-chosen path and
//! issues long-lived public URLs for them.

pub mod client;
pub mod mock;

pub use client::S3Storage;
pub use mock::MockStorage;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, path: &str, data: &[u8], content_type: &str) -> Result<()>;
    async fn public_url(&self, path: &str) -> Result<String>;
}
