use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use rayon::prelude::*;
use serde::Serialize;
use tempfile::NamedTempFile;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Asset, AssetId};
use crate::storage::layout::StorageLayout;

/// Authoritative per-record persistence for one user's assets.
pub trait AssetRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<Asset>>;
    /// Ids of every persisted record, without parsing them.
    fn record_ids(&self) -> Result<Vec<AssetId>>;
    fn load(&self, id: AssetId) -> Result<Asset>;
    fn save(&self, asset: &Asset) -> Result<()>;
    fn delete(&self, id: AssetId) -> Result<()>;
    /// Whether the media file backing a record is still present.
    fn asset_file_exists(&self, filename: &str) -> bool;
}

/// Opaque storage for the serialized index snapshot.
pub trait SnapshotStore: Send + Sync {
    fn load_snapshot(&self) -> Result<Option<Vec<u8>>>;
    fn save_snapshot(&self, bytes: &[u8]) -> Result<()>;
}

/// One JSON file per asset under `metadata/`, snapshot under `meta/`.
pub struct FlatFileStore {
    layout: Arc<StorageLayout>,
}

impl FlatFileStore {
    pub fn new(layout: Arc<StorageLayout>) -> Self {
        FlatFileStore { layout }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    fn record_paths(&self) -> Result<Vec<(AssetId, PathBuf)>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.layout.metadata_dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u32>().ok());
            if let Some(id) = id {
                records.push((AssetId(id), path));
            }
        }
        Ok(records)
    }

    fn read_record(path: &Path) -> Result<Asset> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl AssetRepository for FlatFileStore {
    fn load_all(&self) -> Result<Vec<Asset>> {
        let records = self.record_paths()?;

        let mut assets: Vec<Asset> = records
            .par_iter()
            .filter_map(|(_, path)| match Self::read_record(path) {
                Ok(asset) => Some(asset),
                Err(e) => {
                    log::warn!("Skipping unreadable asset record {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        assets.sort_by_key(|a| a.id);
        Ok(assets)
    }

    fn record_ids(&self) -> Result<Vec<AssetId>> {
        let mut ids: Vec<AssetId> = self.record_paths()?.into_iter().map(|(id, _)| id).collect();
        ids.sort();
        Ok(ids)
    }

    fn load(&self, id: AssetId) -> Result<Asset> {
        let path = self.layout.metadata_path(id);
        Self::read_record(&path).map_err(|e| {
            if e.is_not_found() {
                Error::not_found(format!("asset {}", id))
            } else {
                e
            }
        })
    }

    fn save(&self, asset: &Asset) -> Result<()> {
        write_json_atomic(&self.layout.metadata_path(asset.id), asset)
    }

    fn delete(&self, id: AssetId) -> Result<()> {
        match fs::remove_file(self.layout.metadata_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found(format!("asset {}", id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn asset_file_exists(&self, filename: &str) -> bool {
        !filename.is_empty() && self.layout.asset_path(filename).is_file()
    }
}

impl SnapshotStore for FlatFileStore {
    fn load_snapshot(&self) -> Result<Option<Vec<u8>>> {
        let path = self.layout.index_snapshot_path();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    fn save_snapshot(&self, bytes: &[u8]) -> Result<()> {
        write_bytes_atomic(&self.layout.index_snapshot_path(), bytes)
    }
}

/// Pretty JSON written to a sibling temp file and renamed into place.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data)
}

fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidArgument,
            format!("{} has no parent directory", path.display()),
        )
    })?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Reads a JSON document, `None` when the file does not exist yet.
pub fn read_json_if_exists<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
