use std::collections::HashMap;
use std::hash::Hash;
use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};
use crate::core::types::{Asset, AssetId, MediaType};
use crate::index::Indexer;

/// A literal attribute value an [`ExactIndexer`] keys its postings by.
pub trait ExactKey: Clone + Eq + Hash {
    /// `None` leaves the asset out of the index.
    fn extract(asset: &Asset) -> Option<Self>;
}

impl ExactKey for MediaType {
    fn extract(asset: &Asset) -> Option<Self> {
        Some(asset.media_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CameraKey {
    pub make: String,
    pub model: String,
}

impl CameraKey {
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        CameraKey {
            make: make.into(),
            model: model.into(),
        }
    }
}

impl ExactKey for CameraKey {
    fn extract(asset: &Asset) -> Option<Self> {
        if asset.camera_make.is_empty() && asset.camera_model.is_empty() {
            return None;
        }
        Some(CameraKey::new(asset.camera_make.clone(), asset.camera_model.clone()))
    }
}

/// Exact-match posting list per literal value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactIndexer<K: ExactKey> {
    postings: HashMap<K, RoaringBitmap>,
    doc_key: HashMap<u32, K>,
}

pub type MediaTypeIndexer = ExactIndexer<MediaType>;
pub type CameraIndexer = ExactIndexer<CameraKey>;

impl<K: ExactKey> Default for ExactIndexer<K> {
    fn default() -> Self {
        ExactIndexer {
            postings: HashMap::new(),
            doc_key: HashMap::new(),
        }
    }
}

impl<K: ExactKey> ExactIndexer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the postings of every key accepted by `predicate`.
    pub fn search_where<F>(&self, predicate: F) -> RoaringBitmap
    where
        F: Fn(&K) -> bool,
    {
        let mut result = RoaringBitmap::new();
        for (key, ids) in &self.postings {
            if predicate(key) {
                result |= ids;
            }
        }
        result
    }

    pub fn keys(&self) -> impl Iterator<Item = (&K, u64)> {
        self.postings.iter().map(|(key, ids)| (key, ids.len()))
    }
}

impl CameraIndexer {
    /// Either half may be omitted; an omitted half matches any value.
    pub fn search_camera(&self, make: Option<&str>, model: Option<&str>) -> RoaringBitmap {
        if let (Some(make), Some(model)) = (make, model) {
            return self.search(&CameraKey::new(make, model));
        }
        self.search_where(|key| {
            make.is_none_or(|m| key.make == m) && model.is_none_or(|m| key.model == m)
        })
    }
}

impl<K: ExactKey> Indexer for ExactIndexer<K> {
    type Query = K;

    fn add(&mut self, asset: &Asset) {
        self.remove(asset.id);

        if let Some(key) = K::extract(asset) {
            self.postings
                .entry(key.clone())
                .or_insert_with(RoaringBitmap::new)
                .insert(asset.id.0);
            self.doc_key.insert(asset.id.0, key);
        }
    }

    fn remove(&mut self, id: AssetId) {
        if let Some(key) = self.doc_key.remove(&id.0) {
            if let Some(ids) = self.postings.get_mut(&key) {
                ids.remove(id.0);
                if ids.is_empty() {
                    self.postings.remove(&key);
                }
            }
        }
    }

    fn search(&self, key: &K) -> RoaringBitmap {
        self.postings.get(key).cloned().unwrap_or_default()
    }

    fn key_count(&self) -> usize {
        self.postings.len()
    }
}
