use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use chrono::{NaiveDate, Utc};
use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};
use crate::core::types::{Asset, AssetId};
use crate::index::Indexer;

/// Inclusive day range. An open start is unbounded, an open end means today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DayRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DayRange { start, end }
    }

    fn bounds(&self) -> (Bound<NaiveDate>, Bound<NaiveDate>) {
        let start = match self.start {
            Some(day) => Bound::Included(day),
            None => Bound::Unbounded,
        };
        let end = Bound::Included(self.end.unwrap_or_else(|| Utc::now().date_naive()));
        (start, end)
    }
}

/// Calendar-day buckets over the captured date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateIndexer {
    buckets: BTreeMap<NaiveDate, RoaringBitmap>,
    doc_day: HashMap<u32, NaiveDate>,
}

impl DateIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, day: NaiveDate) -> Option<&RoaringBitmap> {
        self.buckets.get(&day)
    }
}

impl Indexer for DateIndexer {
    type Query = DayRange;

    fn add(&mut self, asset: &Asset) {
        self.remove(asset.id);

        let day = asset.captured_date.date_naive();
        self.buckets
            .entry(day)
            .or_insert_with(RoaringBitmap::new)
            .insert(asset.id.0);
        self.doc_day.insert(asset.id.0, day);
    }

    fn remove(&mut self, id: AssetId) {
        if let Some(day) = self.doc_day.remove(&id.0) {
            if let Some(ids) = self.buckets.get_mut(&day) {
                ids.remove(id.0);
                if ids.is_empty() {
                    self.buckets.remove(&day);
                }
            }
        }
    }

    fn search(&self, range: &DayRange) -> RoaringBitmap {
        let (start, end) = range.bounds();
        if let (Bound::Included(s), Bound::Included(e)) = (start, end) {
            if s > e {
                return RoaringBitmap::new();
            }
        }
        let mut result = RoaringBitmap::new();
        for (_, ids) in self.buckets.range((start, end)) {
            result |= ids;
        }
        result
    }

    fn key_count(&self) -> usize {
        self.buckets.len()
    }
}
