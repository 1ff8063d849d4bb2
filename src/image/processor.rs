use super::{Thumbnail, ThumbnailService};
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

pub const THUMBNAIL_MAX_DIMENSION: u32 = 500;
pub const THUMBNAIL_QUALITY: u8 = 80;

pub struct ThumbnailProcessor {
    max_dimension: u32,
    quality: u8,
}

impl ThumbnailProcessor {
    pub fn new() -> Self {
        Self {
            max_dimension: THUMBNAIL_MAX_DIMENSION,
            quality: THUMBNAIL_QUALITY,
        }
    }

    fn render_sync(data: Vec<u8>, max_dimension: u32, quality: u8) -> Result<Thumbnail> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| Error::Resize(format!("Unreadable image data: {}", e)))?
            .decode()
            .map_err(|e| Error::Resize(format!("Failed to decode image: {}", e)))?;

        let resized = Self::fit_within(img, max_dimension);
        let (width, height) = (resized.width(), resized.height());

        // JPEG has no alpha channel.
        let rgb = resized.to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .encode_image(&rgb)
            .map_err(|e| Error::Resize(format!("Failed to encode thumbnail: {}", e)))?;

        Ok(Thumbnail {
            bytes,
            content_type: "image/jpeg".to_string(),
            width,
            height,
        })
    }

    /// Scale down preserving aspect ratio; never enlarge.
    fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
        if img.width() <= max_dimension && img.height() <= max_dimension {
            img
        } else {
            img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
        }
    }
}

impl Default for ThumbnailProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailService for ThumbnailProcessor {
    async fn thumbnail(&self, image_data: &[u8]) -> Result<Thumbnail> {
        let data = image_data.to_vec();
        let (max_dimension, quality) = (self.max_dimension, self.quality);

        tokio::task::spawn_blocking(move || Self::render_sync(data, max_dimension, quality))
            .await
            .map_err(|e| Error::Resize(format!("Thumbnail task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn create_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_large_image_fits_box_preserving_aspect() {
        let processor = ThumbnailProcessor::new();

        let thumb = processor
            .thumbnail(&create_test_image(1000, 600))
            .await
            .unwrap();

        assert_eq!((thumb.width, thumb.height), (500, 300));
        assert_eq!(thumb.content_type, "image/jpeg");

        let decoded = image::load_from_memory(&thumb.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (500, 300));
        assert_eq!(
            image::guess_format(&thumb.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_tall_image_limited_by_height() {
        let processor = ThumbnailProcessor::new();

        let thumb = processor
            .thumbnail(&create_test_image(400, 800))
            .await
            .unwrap();

        assert_eq!((thumb.width, thumb.height), (250, 500));
    }

    #[tokio::test]
    async fn test_small_image_is_not_enlarged() {
        let processor = ThumbnailProcessor::new();

        let thumb = processor
            .thumbnail(&create_test_image(10, 10))
            .await
            .unwrap();

        assert_eq!((thumb.width, thumb.height), (10, 10));
    }

    #[tokio::test]
    async fn test_undecodable_bytes_fail_with_resize_error() {
        let processor = ThumbnailProcessor::new();

        let err = processor.thumbnail(b"not an image").await.unwrap_err();
        assert!(matches!(err, Error::Resize(_)));

        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\"/>";
        let err = processor.thumbnail(svg).await.unwrap_err();
        assert!(matches!(err, Error::Resize(_)));
    }
}
