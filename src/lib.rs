//! Registered-shortcut launcher with native icon resolution.

pub mod config;
pub mod icon_extractor;
pub mod launcher;

pub use config::{Shortcut, ShortcutStore, StoreError};
pub use icon_extractor::{IconResolver, Image, PixelBuffer};
pub use launcher::{LaunchError, launch};
