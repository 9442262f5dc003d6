use std::path::{Path, PathBuf};
use std::fs;
use crate::core::error::Result;
use crate::core::types::{AssetId, UserId};

/// Directory structure for one user's library
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,      // <root>/users/<user>
    pub assets_dir: PathBuf,    // Original media files
    pub metadata_dir: PathBuf,  // One JSON record per asset
    pub data_dir: PathBuf,      // Collection documents (albums.json, trips.json, ...)
    pub meta_dir: PathBuf,      // Index snapshot
}

impl StorageLayout {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        let assets_dir = base_dir.join("assets");
        let metadata_dir = base_dir.join("metadata");
        let data_dir = base_dir.join("data");
        let meta_dir = base_dir.join("meta");

        fs::create_dir_all(&assets_dir)?;
        fs::create_dir_all(&metadata_dir)?;
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&meta_dir)?;

        Ok(StorageLayout {
            base_dir,
            assets_dir,
            metadata_dir,
            data_dir,
            meta_dir,
        })
    }

    pub fn for_user(root: &Path, user: UserId) -> Result<Self> {
        Self::new(root.join("users").join(user.to_string()))
    }

    /// Directory for data shared by every user (villages).
    pub fn shared_data_dir(root: &Path) -> Result<PathBuf> {
        let dir = root.join("data");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn asset_path(&self, filename: &str) -> PathBuf {
        self.assets_dir.join(filename)
    }

    pub fn metadata_path(&self, id: AssetId) -> PathBuf {
        self.metadata_dir.join(format!("{}.json", id.0))
    }

    pub fn index_snapshot_path(&self) -> PathBuf {
        self.meta_dir.join("index.bin")
    }
}
