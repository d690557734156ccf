//! Thumbnail downscaling.
//!
//! Screenshots arrive as full-viewport JPEGs. Dashboards only need a small
//! preview, so the image is shrunk to [`THUMBNAIL_MAX_WIDTH`] (keeping the
//! aspect ratio) and re-encoded. Images already narrow enough are
//! re-encoded at their own size.

use crate::result::{VisualError, VisualResult};
use image::imageops::FilterType;
use image::GenericImageView;
use std::io::Cursor;

/// Widest thumbnail produced
pub const THUMBNAIL_MAX_WIDTH: u32 = 320;

/// JPEG quality of the re-encoded thumbnail
pub const THUMBNAIL_QUALITY: u8 = 80;

/// Decode `screenshot`, shrink it and encode it as JPEG.
pub fn downscale(screenshot: &[u8]) -> VisualResult<Vec<u8>> {
    let img = image::load_from_memory(screenshot).map_err(|e| VisualError::ImageProcessing {
        message: format!("Failed to decode screenshot: {e}"),
    })?;

    let (width, height) = img.dimensions();
    let img = if width > THUMBNAIL_MAX_WIDTH {
        let scaled_height = (u64::from(height) * u64::from(THUMBNAIL_MAX_WIDTH) / u64::from(width))
            .max(1) as u32;
        img.resize_exact(THUMBNAIL_MAX_WIDTH, scaled_height, FilterType::Triangle)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, THUMBNAIL_QUALITY);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| VisualError::ImageProcessing {
            message: format!("JPEG encoding failed: {e}"),
        })?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([40, 120, 200]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_wide_screenshot_is_shrunk() {
        let thumb = downscale(&jpeg(1280, 720)).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (320, 180));
    }

    #[test]
    fn test_narrow_screenshot_keeps_size() {
        let thumb = downscale(&jpeg(200, 100)).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (200, 100));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = downscale(b"not an image").unwrap_err();
        assert!(matches!(err, VisualError::ImageProcessing { .. }));
    }
}
