//! BGRA device-independent bitmap decoding.
//!
//! Rasters come back from the platform as packed 32-bit B,G,R,A pixels. The
//! decoder reorders them to RGB, flips bottom-up rows, and composites alpha
//! against a white background so the result can be shown without an alpha
//! channel.

use super::error::IconError;
use super::pixel::PixelBuffer;

const BYTES_PER_PIXEL: usize = 4;
const BACKGROUND: u32 = 255;

/// Pixel bits read back from a rasterized icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBitmap {
    pub width: u32,
    pub height: u32,
    /// Scan lines the read-back call reported as copied.
    pub rows_read: u32,
    /// `true` when row 0 is the visual top.
    pub top_down: bool,
    pub bits: Vec<u8>,
}

impl RawBitmap {
    /// A fully read top-down raster.
    pub fn top_down(width: u32, height: u32, bits: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rows_read: height,
            top_down: true,
            bits,
        }
    }
}

/// Blends one channel over white: `round(src * a + 255 * (1 - a))` with
/// `a = alpha / 255`, in exact integer arithmetic.
pub fn composite_channel(src: u8, alpha: u8) -> u8 {
    let (src, alpha) = (src as u32, alpha as u32);
    ((src * alpha + BACKGROUND * (255 - alpha) + 127) / 255) as u8
}

/// Converts a BGRA raster into an RGB [`PixelBuffer`].
pub fn decode(raw: &RawBitmap) -> Result<PixelBuffer, IconError> {
    if raw.rows_read != raw.height {
        return Err(IconError::DecodeMismatch {
            what: "rows",
            expected: raw.height as usize,
            actual: raw.rows_read as usize,
        });
    }
    if raw.width == 0 || raw.width != raw.height {
        return Err(IconError::DecodeMismatch {
            what: "columns",
            expected: raw.height as usize,
            actual: raw.width as usize,
        });
    }

    let (width, height) = (raw.width as usize, raw.height as usize);
    let stride = width * BYTES_PER_PIXEL;
    if raw.bits.len() != stride * height {
        return Err(IconError::DecodeMismatch {
            what: "bytes",
            expected: stride * height,
            actual: raw.bits.len(),
        });
    }

    let mut rgb = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        let source_row = if raw.top_down { row } else { height - 1 - row };
        let line = &raw.bits[source_row * stride..(source_row + 1) * stride];
        for px in line.chunks_exact(BYTES_PER_PIXEL) {
            let (b, g, r, a) = (px[0], px[1], px[2], px[3]);
            rgb.push(composite_channel(r, a));
            rgb.push(composite_channel(g, a));
            rgb.push(composite_channel(b, a));
        }
    }

    PixelBuffer::from_raw(raw.width, raw.height, rgb).ok_or(IconError::DecodeMismatch {
        what: "pixels",
        expected: width * height,
        actual: 0,
    })
}

/// Marks every pixel opaque when the raster carries no alpha at all.
///
/// Icons without an alpha channel are drawn through their AND mask, which
/// leaves alpha at zero everywhere. The surface is pre-painted white, so
/// treating such a raster as opaque reproduces what GDI drew.
/// Returns `true` if the bits were changed.
pub fn fill_missing_alpha(bits: &mut [u8]) -> bool {
    let has_alpha = bits
        .chunks_exact(BYTES_PER_PIXEL)
        .any(|px| px[3] != 0);
    if has_alpha {
        return false;
    }
    for px in bits.chunks_exact_mut(BYTES_PER_PIXEL) {
        px[3] = 255;
    }
    true
}
