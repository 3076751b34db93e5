//! Icon resolution for launcher entries.
//!
//! [`IconResolver::resolve`] turns an executable path into a small RGB raster.
//! It checks its cache, then asks the platform for the shell-associated icon,
//! then tries the binary's own icon resource at several sizes. When all of
//! that fails it hands back a generated placeholder. It never fails.

pub mod bitmap;
pub mod cache;
pub mod default_icon;
pub mod error;
pub mod pixel;
pub mod platform;
pub mod strategy;
#[cfg(windows)]
pub mod win32;

use std::cell::OnceCell;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

pub use bitmap::RawBitmap;
pub use cache::IconCache;
pub use error::IconError;
pub use pixel::{DISPLAY_SIZE, Image, PixelBuffer};
pub use platform::{IconPlatform, NullPlatform, SystemPlatform};

/// Sizes requested from the icon resource, largest first. 32 is the floor.
pub const CANDIDATE_SIZES: [u32; 5] = [256, 128, 64, 48, 32];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Side of every returned raster; larger icons are drawn down to it.
    /// Never exceeds [`DISPLAY_SIZE`], whatever is configured.
    pub display_size: u32,
    /// Resource sizes to try, in order.
    pub candidate_sizes: Vec<u32>,
}

impl ResolverConfig {
    /// `display_size` clamped to `1..=DISPLAY_SIZE`.
    pub fn raster_size(&self) -> u32 {
        self.display_size.clamp(1, DISPLAY_SIZE)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            display_size: DISPLAY_SIZE,
            candidate_sizes: CANDIDATE_SIZES.to_vec(),
        }
    }
}

/// Resolves and caches icons for executable paths.
///
/// One resolver lives for the whole session and owns both the cache and the
/// placeholder. Resolution is synchronous; share it across threads only
/// behind a single `Mutex`.
pub struct IconResolver<P: IconPlatform = SystemPlatform> {
    platform: P,
    config: ResolverConfig,
    cache: IconCache,
    default_icon: OnceCell<Image>,
}

impl Default for IconResolver<SystemPlatform> {
    fn default() -> Self {
        Self::new(SystemPlatform::default())
    }
}

impl<P: IconPlatform> IconResolver<P> {
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, ResolverConfig::default())
    }

    pub fn with_config(platform: P, mut config: ResolverConfig) -> Self {
        config.display_size = config.raster_size();
        Self {
            platform,
            config,
            cache: IconCache::default(),
            default_icon: OnceCell::new(),
        }
    }

    /// Icon for `path`.
    ///
    /// Missing paths get the placeholder without touching the platform and
    /// without a cache entry. Anything else is cached on first resolution,
    /// including the placeholder when every strategy fails.
    pub fn resolve(&mut self, path: &str) -> Image {
        if path.is_empty() || !self.platform.exists(Path::new(path)) {
            debug!("{}", IconError::PathMissing(path.into()));
            return self.default_icon();
        }

        if let Some(image) = self.cache.get(path) {
            return image;
        }

        let image = match self.extract(Path::new(path)) {
            Some(pixels) => {
                info!("Icon OK: '{}' ({}x{})", path, pixels.width(), pixels.height());
                Arc::new(pixels)
            }
            None => {
                info!("Icon FAIL: '{}' -> using placeholder", path);
                self.default_icon()
            }
        };
        self.cache.insert(path, Arc::clone(&image));
        image
    }

    /// The shared placeholder, built on first use.
    pub fn default_icon(&self) -> Image {
        let icon = self
            .default_icon
            .get_or_init(|| Arc::new(default_icon::generate(self.config.raster_size())));
        Arc::clone(icon)
    }

    /// `true` if `image` is the placeholder rather than an extracted icon.
    pub fn is_default(&self, image: &Image) -> bool {
        self.default_icon
            .get()
            .is_some_and(|icon| Arc::ptr_eq(icon, image))
    }

    pub fn cached(&self, path: &str) -> Option<Image> {
        self.cache.get(path)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn extract(&self, path: &Path) -> Option<PixelBuffer> {
        match strategy::shell_icon(&self.platform, path, &self.config) {
            Ok(pixels) => return Some(pixels),
            Err(e) => debug!("{}: {e}", path.display()),
        }
        match strategy::resource_icon(&self.platform, path, &self.config) {
            Ok(pixels) => return Some(pixels),
            Err(e) => debug!("{}: {e}", path.display()),
        }
        None
    }
}
