use image::RgbImage;
use std::sync::Arc;

/// Side length of every icon handed to the front end.
pub const DISPLAY_SIZE: u32 = 32;

/// Shared handle to a finished icon raster. Cloning is cheap and the cache
/// hands out the same allocation on every hit.
pub type Image = Arc<PixelBuffer>;

/// RGB raster, row-major and top-down, with alpha already composited away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    /// Wraps raw RGB triples. Returns `None` unless `data` holds exactly
    /// `width * height * 3` bytes and both dimensions are non-zero.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != (width as usize * height as usize * 3) {
            return None;
        }
        RgbImage::from_raw(width, height, data).map(|image| Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// RGB value at (`x`, `y`), or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Borrow as an `image` buffer for rendering or encoding.
    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.image
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        Self { image }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_requires_exact_length() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 12]).is_some());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 11]).is_none());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 13]).is_none());
        assert!(PixelBuffer::from_raw(0, 0, Vec::new()).is_none());
    }

    #[test]
    fn pixel_reads_row_major() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let buffer = PixelBuffer::from_raw(2, 2, data).unwrap();
        assert_eq!(buffer.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(buffer.pixel(0, 1), Some([7, 8, 9]));
        assert_eq!(buffer.pixel(2, 0), None);
    }
}
