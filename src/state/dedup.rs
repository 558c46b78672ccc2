//! Deduplication sets shared by all page tasks of one crawl session

use dashmap::DashSet;

/// Independent membership sets kept by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DedupNamespace {
    /// Pages already enqueued or fetched
    Visited,
    /// Product links discovered on listing pages
    ProductCandidate,
    /// Image URLs attached to extracted items
    SeenImage,
}

/// Grow-only, concurrency-safe URL sets
///
/// Each namespace is a `DashSet`, so the check and the insert happen in a
/// single shard-locked operation. The store belongs to one session and is
/// dropped with it.
#[derive(Debug, Default)]
pub struct DedupStore {
    visited: DashSet<String>,
    product_candidates: DashSet<String>,
    seen_images: DashSet<String>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, namespace: DedupNamespace) -> &DashSet<String> {
        match namespace {
            DedupNamespace::Visited => &self.visited,
            DedupNamespace::ProductCandidate => &self.product_candidates,
            DedupNamespace::SeenImage => &self.seen_images,
        }
    }

    /// Atomically inserts `url` into `namespace`
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not present and this caller inserted it
    /// * `false` - Some caller marked it earlier
    pub fn check_and_mark(&self, namespace: DedupNamespace, url: &str) -> bool {
        self.set(namespace).insert(url.to_string())
    }

    pub fn contains(&self, namespace: DedupNamespace, url: &str) -> bool {
        self.set(namespace).contains(url)
    }

    pub fn len(&self, namespace: DedupNamespace) -> usize {
        self.set(namespace).len()
    }

    pub fn is_empty(&self, namespace: DedupNamespace) -> bool {
        self.set(namespace).is_empty()
    }
}
