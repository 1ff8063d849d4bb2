//! Thumbnail generation
//!
//! Shrinks the main product image to fit a 500x500 box and re-encodes it as
//! a compact JPEG for listing pages.

pub mod mock;
pub mod processor;

pub use mock::MockThumbnailProcessor;
pub use processor::ThumbnailProcessor;

use crate::Result;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait ThumbnailService: Send + Sync {
    async fn thumbnail(&self, image_data: &[u8]) -> Result<Thumbnail>;
}
