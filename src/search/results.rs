use std::sync::Arc;
use crate::core::types::Asset;

/// One page of matches plus the total before paging.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub assets: Vec<Arc<Asset>>,
    pub total: usize,
    pub took_ms: u64,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.assets.iter().map(|a| a.id.0).collect()
    }
}
