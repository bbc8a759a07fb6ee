use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::error::SourceError;
use crate::models::PixelFrame;

/// Load an image file as a frame, downscaling when either side exceeds `max_dim`
///
/// `max_dim == 0` disables downscaling.
pub fn load_frame(path: &Path, max_dim: u32) -> Result<PixelFrame, SourceError> {
    let img = image::open(path)?;
    frame_from_image(img, max_dim)
}

/// Decode an in-memory image (any format `image` understands) as a frame
pub fn frame_from_bytes(bytes: &[u8], max_dim: u32) -> Result<PixelFrame, SourceError> {
    let img = image::load_from_memory(bytes)?;
    frame_from_image(img, max_dim)
}

/// Rasterize a decoded image into an RGBA frame
pub fn frame_from_image(img: DynamicImage, max_dim: u32) -> Result<PixelFrame, SourceError> {
    let (orig_w, orig_h) = img.dimensions();
    let max_side = orig_w.max(orig_h);
    let rgba = if max_dim > 0 && max_side > max_dim {
        let scale = max_dim as f32 / max_side as f32;
        let new_w = (orig_w as f32 * scale).round().max(1.0) as u32;
        let new_h = (orig_h as f32 * scale).round().max(1.0) as u32;
        tracing::debug!(orig_w, orig_h, new_w, new_h, "downscaling still image");
        img.resize(new_w, new_h, image::imageops::FilterType::Triangle)
            .to_rgba8()
    } else {
        img.to_rgba8()
    };

    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    Ok(PixelFrame::new(width, height, rgba.into_raw())?)
}

/// One-shot source for an uploaded image
#[derive(Debug)]
pub struct StillImage {
    frame: Option<PixelFrame>,
}

impl StillImage {
    /// Wrap an already decoded frame
    pub fn new(frame: PixelFrame) -> Self {
        Self { frame: Some(frame) }
    }

    /// Load from a file
    pub fn open(path: &Path, max_dim: u32) -> Result<Self, SourceError> {
        Ok(Self::new(load_frame(path, max_dim)?))
    }

    /// Load from encoded image bytes (PNG, JPEG, ...)
    pub fn from_bytes(bytes: &[u8], max_dim: u32) -> Result<Self, SourceError> {
        Ok(Self::new(frame_from_bytes(bytes, max_dim)?))
    }

    /// Take the frame; later calls return `None`
    pub fn take(&mut self) -> Option<PixelFrame> {
        self.frame.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_frame_from_png_bytes() {
        let frame = frame_from_bytes(&png_bytes(4, 3), 0).unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 3));
        // RGB input gains an opaque alpha channel
        assert_eq!(&frame.pixels()[..8], &[0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_downscale_keeps_aspect() {
        let frame = frame_from_bytes(&png_bytes(400, 200), 100).unwrap();
        assert_eq!((frame.width(), frame.height()), (100, 50));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let err = frame_from_bytes(b"definitely not an image", 0).unwrap_err();
        assert!(matches!(err, SourceError::Image(_)));
    }

    #[test]
    fn test_still_image_yields_once() {
        let mut still = StillImage::from_bytes(&png_bytes(2, 2), 0).unwrap();
        assert!(still.take().is_some());
        assert!(still.take().is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = StillImage::open(Path::new("does/not/exist.png"), 0).unwrap_err();
        assert!(matches!(err, SourceError::Image(_) | SourceError::Io(_)));
    }
}
