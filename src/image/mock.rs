use super::{Thumbnail, ThumbnailService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockThumbnailProcessor {
    process_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockThumbnailProcessor {
    pub fn new() -> Self {
        Self {
            process_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_process_count(&self) -> usize {
        *self.process_count.lock().unwrap()
    }
}

impl Default for MockThumbnailProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailService for MockThumbnailProcessor {
    async fn thumbnail(&self, image_data: &[u8]) -> Result<Thumbnail> {
        let mut count = self.process_count.lock().unwrap();
        *count += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Resize("Mock failure".to_string()));
        }

        Ok(Thumbnail {
            bytes: image_data.iter().rev().copied().collect(),
            content_type: "image/jpeg".to_string(),
            width: 500,
            height: 500,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_thumbnail_processor() {
        let processor = MockThumbnailProcessor::new();

        let thumb = processor.thumbnail(b"abc").await.unwrap();

        assert_eq!(thumb.bytes, b"cba".to_vec());
        assert_eq!(thumb.content_type, "image/jpeg");
        assert_eq!(processor.get_process_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let processor = MockThumbnailProcessor::new().with_failure(true);

        let result = processor.thumbnail(b"data").await;
        assert!(matches!(result, Err(Error::Resize(_))));
        assert_eq!(processor.get_process_count(), 1);
    }
}
