use std::path::Path;

use super::bitmap::RawBitmap;
use super::error::IconError;

/// Operating-system icon facilities used by the resolver.
///
/// `Icon` owns a native icon handle and must release it when dropped, so a
/// handle can never outlive the strategy call that acquired it.
pub trait IconPlatform {
    type Icon;

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Icon the shell associates with the file, at the system large size.
    fn shell_icon(&self, path: &Path) -> Option<Self::Icon>;

    /// Icon at resource index 0 of the binary, requested at `size` pixels.
    fn resource_icon(&self, path: &Path, size: u32) -> Option<Self::Icon>;

    /// Draws `icon` onto a `size`×`size` surface and reads the bits back.
    fn rasterize(&self, icon: &Self::Icon, size: u32) -> Result<RawBitmap, IconError>;
}

/// Never yields an icon. Used where no native icon API is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

#[derive(Debug)]
pub enum NoIcon {}

impl IconPlatform for NullPlatform {
    type Icon = NoIcon;

    fn shell_icon(&self, _path: &Path) -> Option<NoIcon> {
        None
    }

    fn resource_icon(&self, _path: &Path, _size: u32) -> Option<NoIcon> {
        None
    }

    fn rasterize(&self, icon: &NoIcon, _size: u32) -> Result<RawBitmap, IconError> {
        match *icon {}
    }
}

#[cfg(windows)]
pub type SystemPlatform = super::win32::Win32Platform;

#[cfg(not(windows))]
pub type SystemPlatform = NullPlatform;
