use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Per-user storage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_assets: usize,
    pub cache_size: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub uploads_24h: usize,
    pub orphans_removed: usize,
}

/// Index health information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    pub last_rebuild: Option<DateTime<Utc>>,
    pub last_save: Option<DateTime<Utc>>,
    pub asset_count: usize,
    pub text_index_size: usize,
    pub date_index_size: usize,
    pub dirty: bool,
}
