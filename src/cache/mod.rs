//! Bounded page cache with LRU eviction
//!
//! Stores fully rendered pages keyed by page number. Capacity-bounded: a
//! `put` at capacity synchronously evicts the least-recently-used entry
//! before inserting. All mutation is serialized behind an async RwLock.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::types::{PageDescriptor, PageImage, RowRect};

/// Default number of resident pages (current page ± a few)
const DEFAULT_CAPACITY: usize = 8;

/// Cache configuration options
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CacheConfig {
    /// Maximum number of rendered pages to keep
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// A rendered page resident in the cache
///
/// Handed out only as an `Arc` read-only view; the rows are retained so a
/// caller can map a tap or selection position back into the text.
#[derive(Debug)]
pub struct CachedPage {
    pub descriptor: PageDescriptor,
    pub image: PageImage,
    pub rows: Vec<RowRect>,
}

impl CachedPage {
    /// 1-based page number
    pub fn number(&self) -> u32 {
        self.descriptor.number
    }

    /// The row whose vertical band contains the page-space point
    pub fn row_at_point(&self, _x: f32, y: f32) -> Option<&RowRect> {
        self.rows.iter().find(|row| row.contains_y(y))
    }

    /// Text offset of the row containing the page-space point
    ///
    /// Returns the row's start offset; finer-grained hit testing within a
    /// row needs glyph metrics the core does not hold.
    pub fn offset_at_point(&self, x: f32, y: f32) -> Option<usize> {
        self.row_at_point(x, y).map(|row| row.start)
    }
}

/// Bounded store of rendered pages
#[derive(Clone)]
pub struct PageCache {
    pages: Arc<RwLock<LruCache<u32, Arc<CachedPage>>>>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl PageCache {
    /// Create a cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).expect("nonzero default"));
        Self {
            pages: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Fetch a page, refreshing its recency
    pub async fn get(&self, page: u32) -> Option<Arc<CachedPage>> {
        let mut pages = self.pages.write().await;
        let hit = pages.get(&page).cloned();
        trace!(page, hit = hit.is_some(), "cache lookup");
        hit
    }

    /// Insert a page, evicting the least-recently-used entry at capacity
    ///
    /// A put for a page number already present fully replaces the stale
    /// entry and refreshes its recency.
    pub async fn put(&self, page: Arc<CachedPage>) {
        let number = page.number();
        let mut pages = self.pages.write().await;
        if let Some((evicted, _)) = pages.push(number, page) {
            if evicted != number {
                debug!(page = evicted, "evicted least-recently-used page");
            }
        }
    }

    /// Drop every entry
    pub async fn invalidate_all(&self) {
        let mut pages = self.pages.write().await;
        debug!(dropped = pages.len(), "page cache invalidated");
        pages.clear();
    }

    /// Number of resident pages
    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    /// Whether the cache holds no pages
    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }

    /// Usage statistics
    pub async fn stats(&self) -> CacheStats {
        let pages = self.pages.read().await;
        CacheStats {
            used: pages.len(),
            capacity: pages.cap().get(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Resident pages
    pub used: usize,
    /// Maximum resident pages
    pub capacity: usize,
}
