use std::sync::Arc;
use serde::Serialize;
use crate::core::error::Result;
use crate::core::types::{Asset, CollectionId};
use crate::query::options::{SearchOptions, SortKey, SortOrder};
use crate::store::asset_store::AssetStore;

/// Assets grouped by the camera that took them. Derived on every pass, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraCollection {
    pub id: CollectionId,
    pub camera_make: String,
    pub camera_model: String,
    pub count: usize,
    #[serde(skip)]
    pub preview: Vec<Arc<Asset>>,
}

/// One collection per distinct (make, model) pair with a known model, in
/// (make, model) order.
pub fn synthesize(store: &AssetStore, preview_limit: usize) -> Result<Vec<CameraCollection>> {
    let mut keys: Vec<_> = store
        .indexes()
        .camera
        .keys()
        .filter(|(key, _)| !key.model.is_empty())
        .map(|(key, _)| key.clone())
        .collect();
    keys.sort();

    let mut cameras = Vec::with_capacity(keys.len());
    for (i, key) in keys.into_iter().enumerate() {
        let options = SearchOptions::new()
            .camera(Some(key.make.as_str()), Some(key.model.as_str()))
            .sort(SortKey::ModificationDate.as_str(), SortOrder::Desc)
            .page(preview_limit, 0);
        let results = store.search(&options)?;
        if results.total == 0 {
            continue;
        }
        cameras.push(CameraCollection {
            id: i as CollectionId + 1,
            camera_make: key.make,
            camera_model: key.model,
            count: results.total,
            preview: results.assets,
        });
    }
    Ok(cameras)
}
