use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_path: PathBuf,
    pub cache_size: usize,                      // Asset records kept in the LRU cache
    pub max_upload_size: u64,                   // Bytes

    pub maintenance_enabled: bool,
    pub save_interval: Duration,                // Persist index snapshot if dirty
    pub stats_interval: Duration,               // Reset rolling 24h counters
    pub cleanup_interval: Duration,             // Purge assets whose file is gone
    pub rebuild_interval: Duration,             // Full index rebuild

    pub preview: PreviewSizes,
}

/// Number of assets kept in memory per collection preview.
#[derive(Debug, Clone, Copy)]
pub struct PreviewSizes {
    pub album: usize,
    pub trip: usize,
    pub person: usize,
    pub pinned: usize,
    pub shared_album: usize,
    pub camera: usize,
}

impl Default for PreviewSizes {
    fn default() -> Self {
        PreviewSizes {
            album: 6,
            trip: 2,
            person: 1,
            pinned: 1,
            shared_album: 6,
            camera: 6,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from("./data"),
            cache_size: 10_000,
            max_upload_size: 100 * 1024 * 1024,        // 100MB

            maintenance_enabled: true,
            save_interval: Duration::from_secs(5 * 60),
            stats_interval: Duration::from_secs(30 * 60),
            cleanup_interval: Duration::from_secs(60 * 60),
            rebuild_interval: Duration::from_secs(24 * 60 * 60),

            preview: PreviewSizes::default(),
        }
    }
}

impl Config {
    pub fn for_path(storage_path: impl Into<PathBuf>) -> Self {
        Config {
            storage_path: storage_path.into(),
            ..Default::default()
        }
    }
}
