use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::core::types::{Asset, AssetId};

/// Recency-ordered asset cache in front of the flat record store.
///
/// Eviction is silent: a miss just means the caller goes back to the
/// repository. All operations are O(1) behind a single mutex.
pub struct AssetCache {
    cache: Mutex<LruCache<AssetId, Arc<Asset>>>,
    capacity: usize,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl AssetCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        AssetCache {
            cache: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    pub fn get(&self, id: AssetId) -> Option<Arc<Asset>> {
        let mut cache = self.cache.lock();
        if let Some(asset) = cache.get(&id) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            Some(asset.clone())
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert or refresh; evicts the least recently used entry past capacity.
    pub fn put(&self, id: AssetId, asset: Arc<Asset>) {
        self.cache.lock().put(id, asset);
    }

    pub fn remove(&self, id: AssetId) {
        self.cache.lock().pop(&id);
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Advisory only.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hit_count: u64,
    pub miss_count: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}
