use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use oxide_launcher::icon_extractor::{
    DISPLAY_SIZE, IconError, IconPlatform, IconResolver, RawBitmap, ResolverConfig,
};
use tempfile::NamedTempFile;

/// What a mock icon handle produces when rasterized.
#[derive(Debug, Clone, Copy)]
enum Raster {
    /// Opaque solid colour, RGB.
    Solid([u8; 3]),
    /// One scan line short of the requested height.
    ShortRead,
    /// Consistent raster at half the requested side.
    HalfSize,
    /// Draw call fails outright.
    DrawFails,
}

#[derive(Default)]
struct Calls {
    shell: Cell<u32>,
    resource_sizes: RefCell<Vec<u32>>,
    raster_sizes: RefCell<Vec<u32>>,
    acquired: Cell<u32>,
    released: Cell<u32>,
}

impl Calls {
    fn os_calls(&self) -> usize {
        self.shell.get() as usize + self.resource_sizes.borrow().len()
    }
}

struct MockIcon {
    raster: Raster,
    calls: Rc<Calls>,
}

impl Drop for MockIcon {
    fn drop(&mut self) {
        self.calls.released.set(self.calls.released.get() + 1);
    }
}

#[derive(Default)]
struct MockPlatform {
    shell: Option<Raster>,
    resource: HashMap<u32, Raster>,
    calls: Rc<Calls>,
}

impl MockPlatform {
    fn icon(&self, raster: Raster) -> MockIcon {
        self.calls.acquired.set(self.calls.acquired.get() + 1);
        MockIcon {
            raster,
            calls: Rc::clone(&self.calls),
        }
    }
}

impl IconPlatform for MockPlatform {
    type Icon = MockIcon;

    fn shell_icon(&self, _path: &Path) -> Option<MockIcon> {
        self.calls.shell.set(self.calls.shell.get() + 1);
        self.shell.map(|raster| self.icon(raster))
    }

    fn resource_icon(&self, _path: &Path, size: u32) -> Option<MockIcon> {
        self.calls.resource_sizes.borrow_mut().push(size);
        self.resource.get(&size).map(|&raster| self.icon(raster))
    }

    fn rasterize(&self, icon: &MockIcon, size: u32) -> Result<RawBitmap, IconError> {
        self.calls.raster_sizes.borrow_mut().push(size);
        let opaque = |[r, g, b]: [u8; 3]| [b, g, r, 255].repeat((size * size) as usize);
        match icon.raster {
            Raster::Solid(rgb) => Ok(RawBitmap::top_down(size, size, opaque(rgb))),
            Raster::ShortRead => Ok(RawBitmap {
                rows_read: size - 1,
                ..RawBitmap::top_down(size, size, opaque([0, 0, 0]))
            }),
            Raster::HalfSize => {
                let half = size / 2;
                let bits = [0, 0, 0, 255].repeat((half * half) as usize);
                Ok(RawBitmap::top_down(half, half, bits))
            }
            Raster::DrawFails => Err(IconError::Rasterize("DrawIconEx failed".into())),
        }
    }
}

fn existing_file() -> (NamedTempFile, String) {
    let file = NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();
    (file, path)
}

fn assert_balanced(calls: &Calls) {
    assert_eq!(calls.acquired.get(), calls.released.get());
}

#[test]
fn missing_path_skips_extraction() {
    let platform = MockPlatform {
        shell: Some(Raster::Solid([1, 2, 3])),
        ..Default::default()
    };
    let mut resolver = IconResolver::new(platform);

    let image = resolver.resolve("/no/such/dir/tool.exe");
    let empty = resolver.resolve("");

    assert!(Arc::ptr_eq(&image, &resolver.default_icon()));
    assert!(Arc::ptr_eq(&empty, &image));
    assert_eq!(resolver.platform().calls.os_calls(), 0);
    assert_eq!(resolver.cache_len(), 0);
}

#[test]
fn shell_icon_is_cached_and_reused() {
    let (_file, path) = existing_file();
    let platform = MockPlatform {
        shell: Some(Raster::Solid([10, 120, 200])),
        ..Default::default()
    };
    let mut resolver = IconResolver::new(platform);

    let first = resolver.resolve(&path);
    let calls_after_first = resolver.platform().calls.os_calls();
    let second = resolver.resolve(&path);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!resolver.is_default(&first));
    assert_eq!(first.pixel(0, 0), Some([10, 120, 200]));
    assert_eq!(calls_after_first, 1);
    assert_eq!(resolver.platform().calls.os_calls(), calls_after_first);
    assert!(resolver.platform().calls.resource_sizes.borrow().is_empty());
    assert_balanced(&resolver.platform().calls);
}

#[test]
fn resource_icon_found_at_64_is_drawn_at_display_size() {
    let (_file, path) = existing_file();
    let platform = MockPlatform {
        shell: None,
        resource: HashMap::from([(64, Raster::Solid([0, 200, 0]))]),
        ..Default::default()
    };
    let mut resolver = IconResolver::new(platform);

    let image = resolver.resolve(&path);

    assert_eq!((image.width(), image.height()), (DISPLAY_SIZE, DISPLAY_SIZE));
    assert_eq!(image.pixel(31, 31), Some([0, 200, 0]));
    assert!(Arc::ptr_eq(&resolver.cached(&path).unwrap(), &image));

    let calls = &resolver.platform().calls;
    assert_eq!(*calls.resource_sizes.borrow(), [256, 128, 64]);
    assert_eq!(*calls.raster_sizes.borrow(), [32]);
    assert_balanced(calls);
}

#[test]
fn failed_decode_releases_handle_and_tries_smaller() {
    let (_file, path) = existing_file();
    let platform = MockPlatform {
        shell: Some(Raster::DrawFails),
        resource: HashMap::from([
            (256, Raster::ShortRead),
            (128, Raster::Solid([90, 90, 90])),
        ]),
        ..Default::default()
    };
    let mut resolver = IconResolver::new(platform);

    let image = resolver.resolve(&path);

    assert_eq!(image.pixel(5, 5), Some([90, 90, 90]));
    let calls = &resolver.platform().calls;
    assert_eq!(*calls.resource_sizes.borrow(), [256, 128]);
    assert_eq!(calls.acquired.get(), 3);
    assert_balanced(calls);
}

#[test]
fn unusable_sizes_are_not_retried() {
    let (_file, path) = existing_file();
    let platform = MockPlatform {
        resource: [256, 128, 64, 48, 32]
            .into_iter()
            .map(|size| (size, Raster::DrawFails))
            .collect(),
        ..Default::default()
    };
    let mut resolver = IconResolver::new(platform);

    let image = resolver.resolve(&path);

    assert!(resolver.is_default(&image));
    let calls = &resolver.platform().calls;
    assert_eq!(*calls.resource_sizes.borrow(), [256, 128, 64, 48, 32]);
    assert_eq!(calls.acquired.get(), 5);
    assert_balanced(calls);
}

#[test]
fn total_failure_caches_placeholder() {
    let (_file, path) = existing_file();
    let mut resolver = IconResolver::new(MockPlatform::default());

    let first = resolver.resolve(&path);
    let calls_after_first = resolver.platform().calls.os_calls();
    let second = resolver.resolve(&path);

    assert!(resolver.is_default(&first));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls_after_first, 1 + 5);
    assert_eq!(resolver.platform().calls.os_calls(), calls_after_first);
    assert_eq!(resolver.cache_len(), 1);
}

#[test]
fn placeholder_has_accent_centre() {
    let resolver = IconResolver::new(MockPlatform::default());
    let icon = resolver.default_icon();
    assert_eq!(icon.pixel(16, 16), Some([0, 0, 200]));
    assert_eq!(icon.pixel(0, 0), Some([240, 240, 240]));
}

#[test]
fn undersized_raster_falls_through_to_next_candidate() {
    let (_file, path) = existing_file();
    let platform = MockPlatform {
        resource: HashMap::from([
            (256, Raster::HalfSize),
            (128, Raster::Solid([30, 60, 90])),
        ]),
        ..Default::default()
    };
    let mut resolver = IconResolver::new(platform);

    let image = resolver.resolve(&path);

    assert_eq!((image.width(), image.height()), (DISPLAY_SIZE, DISPLAY_SIZE));
    assert_eq!(image.pixel(0, 0), Some([30, 60, 90]));
    let calls = &resolver.platform().calls;
    assert_eq!(*calls.resource_sizes.borrow(), [256, 128]);
    assert_eq!(calls.acquired.get(), 2);
    assert_balanced(calls);
}

#[test]
fn configured_display_size_never_exceeds_cap() {
    let (_file, path) = existing_file();
    let platform = MockPlatform {
        resource: HashMap::from([(64, Raster::Solid([5, 5, 5]))]),
        ..Default::default()
    };
    let config = ResolverConfig {
        display_size: 64,
        ..ResolverConfig::default()
    };
    let mut resolver = IconResolver::with_config(platform, config);

    let image = resolver.resolve(&path);

    assert_eq!((image.width(), image.height()), (DISPLAY_SIZE, DISPLAY_SIZE));
    assert_eq!(resolver.default_icon().width(), DISPLAY_SIZE);
    assert!(
        resolver
            .platform()
            .calls
            .raster_sizes
            .borrow()
            .iter()
            .all(|&size| size <= DISPLAY_SIZE)
    );
}
