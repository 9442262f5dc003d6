pub mod text;
pub mod date;
pub mod flag;
pub mod exact;
pub mod index_set;

use roaring::RoaringBitmap;
use crate::core::types::{Asset, AssetId};

/// One secondary index over a user's assets.
///
/// Re-indexing after a mutation is `remove` followed by `add`; every
/// implementation makes `add` idempotent by dropping the previous postings of
/// the asset first.
pub trait Indexer {
    type Query: ?Sized;

    fn add(&mut self, asset: &Asset);

    fn remove(&mut self, id: AssetId);

    /// All ids matching `query`.
    fn search(&self, query: &Self::Query) -> RoaringBitmap;

    /// `candidates ∩ search(query)`.
    fn filter(&self, candidates: &RoaringBitmap, query: &Self::Query) -> RoaringBitmap {
        candidates & &self.search(query)
    }

    /// Number of distinct posting keys.
    fn key_count(&self) -> usize;
}
