use crate::error::FrameError;

/// Bytes per RGBA pixel
pub const RGBA_CHANNELS: usize = 4;

/// One captured or uploaded image as a tightly packed RGBA buffer
///
/// The buffer is owned: submitting a frame for decoding moves it, so a frame is
/// consumed by exactly one decode.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl PixelFrame {
    /// Create a frame, checking that `pixels` holds `width * height` RGBA pixels
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, FrameError> {
        let expected = expected_len(width, height)?;
        if pixels.len() != expected {
            return Err(FrameError::BufferLength {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a frame where every pixel has the same RGBA value
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Result<Self, FrameError> {
        let len = expected_len(width, height)?;
        let mut pixels = Vec::with_capacity(len);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self::new(width, height, pixels)
    }

    /// Build an opaque RGBA frame from one luminance byte per pixel
    pub fn from_luma(width: usize, height: usize, luma: &[u8]) -> Result<Self, FrameError> {
        let len = expected_len(width, height)?;
        if luma.len() != width * height {
            return Err(FrameError::BufferLength {
                width,
                height,
                expected: width * height,
                actual: luma.len(),
            });
        }
        let mut pixels = Vec::with_capacity(len);
        for &y in luma {
            pixels.extend_from_slice(&[y, y, y, 255]);
        }
        Self::new(width, height, pixels)
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels (not bytes)
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Give the buffer back to the caller
    pub fn into_parts(self) -> (usize, usize, Vec<u8>) {
        (self.width, self.height, self.pixels)
    }
}

// Frames are large; keep debug output to the shape.
impl std::fmt::Debug for PixelFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

fn expected_len(width: usize, height: usize) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::EmptyDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(RGBA_CHANNELS))
        .ok_or(FrameError::Overflow { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new_validates_length() {
        assert!(PixelFrame::new(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            PixelFrame::new(2, 2, vec![0; 12]),
            Err(FrameError::BufferLength {
                width: 2,
                height: 2,
                expected: 16,
                actual: 12
            })
        );
    }

    #[test]
    fn test_frame_rejects_empty() {
        assert_eq!(
            PixelFrame::new(0, 10, Vec::new()),
            Err(FrameError::EmptyDimensions {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_frame_rejects_overflow() {
        assert!(matches!(
            PixelFrame::new(usize::MAX, 2, Vec::new()),
            Err(FrameError::Overflow { .. })
        ));
    }

    #[test]
    fn test_from_luma() {
        let frame = PixelFrame::from_luma(2, 1, &[10, 200]).unwrap();
        assert_eq!(frame.pixels(), &[10, 10, 10, 255, 200, 200, 200, 255]);
        assert_eq!(frame.pixel_count(), 2);
    }

    #[test]
    fn test_filled() {
        let frame = PixelFrame::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(frame.pixels().len(), 24);
        assert_eq!(&frame.pixels()[20..], &[1, 2, 3, 4]);
    }
}
