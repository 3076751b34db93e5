use std::collections::HashMap;
use std::sync::Arc;

use super::pixel::Image;

/// Path → icon memo for the lifetime of the session.
///
/// Keys are the path strings exactly as requested. Entries are never evicted
/// or refreshed, so an executable whose icon changes keeps its first icon
/// until the resolver is rebuilt.
#[derive(Debug, Default)]
pub struct IconCache {
    entries: HashMap<String, Image>,
}

impl IconCache {
    pub fn get(&self, path: &str) -> Option<Image> {
        self.entries.get(path).map(Arc::clone)
    }

    pub fn insert(&mut self, path: impl Into<String>, image: Image) {
        self.entries.insert(path.into(), image);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
