//! Icon extraction strategies, tried in order by the resolver.
//!
//! Each strategy owns every icon handle it acquires. Handles are dropped (and
//! so released) before the strategy returns, whichever way it returns.

use std::path::Path;

use tracing::{debug, trace};

use super::ResolverConfig;
use super::bitmap;
use super::error::IconError;
use super::pixel::PixelBuffer;
use super::platform::IconPlatform;

/// Shell-associated icon, drawn at the display size.
pub fn shell_icon<P: IconPlatform>(
    platform: &P,
    path: &Path,
    config: &ResolverConfig,
) -> Result<PixelBuffer, IconError> {
    let icon = platform
        .shell_icon(path)
        .ok_or(IconError::StrategyUnavailable("shell"))?;
    render(platform, &icon, config.raster_size())
}

/// Icon embedded at resource index 0, tried from the largest preferred size
/// down. The first candidate that draws and decodes cleanly wins; a failed
/// candidate is released and never retried.
pub fn resource_icon<P: IconPlatform>(
    platform: &P,
    path: &Path,
    config: &ResolverConfig,
) -> Result<PixelBuffer, IconError> {
    for &candidate in &config.candidate_sizes {
        let Some(icon) = platform.resource_icon(path, candidate) else {
            trace!("no resource icon at {candidate}px for {}", path.display());
            continue;
        };
        let raster_size = candidate.min(config.raster_size());
        match render(platform, &icon, raster_size) {
            Ok(pixels) => {
                debug!(
                    "resource icon for {} found at {candidate}px, drawn at {raster_size}px",
                    path.display()
                );
                return Ok(pixels);
            }
            Err(e) => debug!("resource icon at {candidate}px unusable: {e}"),
        }
    }
    Err(IconError::StrategyUnavailable("resource"))
}

/// Rasterizes and decodes, trusting the decoded dimensions rather than the
/// requested ones.
fn render<P: IconPlatform>(
    platform: &P,
    icon: &P::Icon,
    size: u32,
) -> Result<PixelBuffer, IconError> {
    let raw = platform.rasterize(icon, size)?;
    let pixels = bitmap::decode(&raw)?;
    if pixels.width() != size {
        return Err(IconError::DecodeMismatch {
            what: "pixels per row",
            expected: size as usize,
            actual: pixels.width() as usize,
        });
    }
    Ok(pixels)
}
