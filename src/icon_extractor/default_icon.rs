use image::{Rgb, RgbImage};

use super::pixel::PixelBuffer;

const INSET: u32 = 6;
const ACCENT: [u8; 3] = [0, 0, 200];
const BACKGROUND: [u8; 3] = [240, 240, 240];

/// Placeholder shown when no real icon can be extracted: a blue square on a
/// light grey field. Pure and deterministic.
pub fn generate(size: u32) -> PixelBuffer {
    let size = size.max(1);
    let inner = INSET..size.saturating_sub(INSET);
    RgbImage::from_fn(size, size, |x, y| {
        if inner.contains(&x) && inner.contains(&y) {
            Rgb(ACCENT)
        } else {
            Rgb(BACKGROUND)
        }
    })
    .into()
}
