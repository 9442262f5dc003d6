use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};
use crate::core::types::{Asset, AssetId};
use crate::index::Indexer;
use crate::index::date::DateIndexer;
use crate::index::exact::{CameraIndexer, MediaTypeIndexer};
use crate::index::flag::{BoolIndexer, FlagField};
use crate::index::text::TextIndexer;

/// Every secondary index of one user's library, kept in sync as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSet {
    pub text: TextIndexer,
    pub date: DateIndexer,
    pub media_type: MediaTypeIndexer,
    pub camera: CameraIndexer,
    pub flags: Vec<BoolIndexer>,
    all: RoaringBitmap,
}

impl Default for IndexSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSet {
    pub fn new() -> Self {
        IndexSet {
            text: TextIndexer::new(),
            date: DateIndexer::new(),
            media_type: MediaTypeIndexer::new(),
            camera: CameraIndexer::new(),
            flags: FlagField::ALL.iter().map(|f| BoolIndexer::new(*f)).collect(),
            all: RoaringBitmap::new(),
        }
    }

    /// Wholesale rebuild from a full record scan.
    pub fn rebuild<'a, I>(assets: I) -> Self
    where
        I: IntoIterator<Item = &'a Asset>,
    {
        let mut set = IndexSet::new();
        for asset in assets {
            set.add(asset);
        }
        set
    }

    /// Adds or re-indexes `asset` in every indexer.
    pub fn add(&mut self, asset: &Asset) {
        self.text.add(asset);
        self.date.add(asset);
        self.media_type.add(asset);
        self.camera.add(asset);
        for flag in &mut self.flags {
            flag.add(asset);
        }
        self.all.insert(asset.id.0);
    }

    pub fn remove(&mut self, id: AssetId) {
        self.text.remove(id);
        self.date.remove(id);
        self.media_type.remove(id);
        self.camera.remove(id);
        for flag in &mut self.flags {
            flag.remove(id);
        }
        self.all.remove(id.0);
    }

    pub fn flag(&self, field: FlagField) -> Option<&BoolIndexer> {
        self.flags.iter().find(|f| f.field() == field)
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.all.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.all.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
