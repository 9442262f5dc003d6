use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};
use crate::core::types::{Asset, AssetId};
use crate::index::Indexer;

/// Stored boolean attributes of an asset. Landscape is derived from the
/// dimensions and deliberately has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlagField {
    Favorite,
    Hidden,
    Screenshot,
    Camera,
}

impl FlagField {
    pub const ALL: [FlagField; 4] = [
        FlagField::Favorite,
        FlagField::Hidden,
        FlagField::Screenshot,
        FlagField::Camera,
    ];

    pub fn value(&self, asset: &Asset) -> bool {
        match self {
            FlagField::Favorite => asset.is_favorite,
            FlagField::Hidden => asset.is_hidden,
            FlagField::Screenshot => asset.is_screenshot,
            FlagField::Camera => asset.is_camera,
        }
    }
}

/// Disjoint true/false posting lists for one flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoolIndexer {
    field: FlagField,
    true_set: RoaringBitmap,
    false_set: RoaringBitmap,
}

impl BoolIndexer {
    pub fn new(field: FlagField) -> Self {
        BoolIndexer {
            field,
            true_set: RoaringBitmap::new(),
            false_set: RoaringBitmap::new(),
        }
    }

    pub fn field(&self) -> FlagField {
        self.field
    }
}

impl Indexer for BoolIndexer {
    type Query = bool;

    fn add(&mut self, asset: &Asset) {
        let id = asset.id.0;
        if self.field.value(asset) {
            self.true_set.insert(id);
            self.false_set.remove(id);
        } else {
            self.false_set.insert(id);
            self.true_set.remove(id);
        }
    }

    fn remove(&mut self, id: AssetId) {
        self.true_set.remove(id.0);
        self.false_set.remove(id.0);
    }

    fn search(&self, value: &bool) -> RoaringBitmap {
        if *value {
            self.true_set.clone()
        } else {
            self.false_set.clone()
        }
    }

    fn filter(&self, candidates: &RoaringBitmap, value: &bool) -> RoaringBitmap {
        if *value {
            candidates & &self.true_set
        } else {
            candidates & &self.false_set
        }
    }

    fn key_count(&self) -> usize {
        usize::from(!self.true_set.is_empty()) + usize::from(!self.false_set.is_empty())
    }
}
