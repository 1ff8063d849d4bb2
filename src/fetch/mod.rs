//! Remote image retrieval
//!
//! Fetches arbitrary externally hosted images as raw bytes, presenting as a
//! desktop browser so that hosts which block unknown clients still respond.

pub mod client;
pub mod mock;

pub use client::HttpImageFetcher;
pub use mock::MockImageFetcher;

use crate::models::FetchedImage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}
