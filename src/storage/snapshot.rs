use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, Result};
use crate::core::types::AssetId;
use crate::index::index_set::IndexSet;

const SNAPSHOT_VERSION: u32 = 1;

/// Persisted image of a store's in-memory state, enough to skip a full scan
/// on open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    pub last_id: u32,
    pub created_at: DateTime<Utc>,
    pub catalog: BTreeMap<AssetId, String>,
    pub indexes: IndexSet,
}

impl IndexSnapshot {
    pub fn new(last_id: u32, catalog: BTreeMap<AssetId, String>, indexes: IndexSet) -> Self {
        IndexSnapshot {
            version: SNAPSHOT_VERSION,
            last_id,
            created_at: Utc::now(),
            catalog,
            indexes,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_parts(self.last_id, &self.catalog, &self.indexes)
    }

    /// Every failure maps to `IndexCorrupted` so the caller can fall back to a
    /// rebuild.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::index_corrupted("snapshot truncated"));
        }
        let (head, body) = bytes.split_at(4);
        let expected = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);

        let mut hasher = Hasher::new();
        hasher.update(body);
        if hasher.finalize() != expected {
            return Err(Error::index_corrupted("snapshot checksum mismatch"));
        }

        let payload = lz4_flex::decompress_size_prepended(body)
            .map_err(|e| Error::index_corrupted(format!("snapshot decompression: {}", e)))?;
        let snapshot: IndexSnapshot = bincode::deserialize(&payload)
            .map_err(|e| Error::index_corrupted(format!("snapshot decode: {}", e)))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::index_corrupted(format!(
                "snapshot version {} unsupported",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

// Same field layout as IndexSnapshot, borrowing the live state instead of
// cloning it.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    last_id: u32,
    created_at: DateTime<Utc>,
    catalog: &'a BTreeMap<AssetId, String>,
    indexes: &'a IndexSet,
}

// [ CRC32 of body, LE ] [ lz4(size-prefixed) bincode payload ]
pub fn encode_parts(
    last_id: u32,
    catalog: &BTreeMap<AssetId, String>,
    indexes: &IndexSet,
) -> Result<Vec<u8>> {
    let payload = bincode::serialize(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        last_id,
        created_at: Utc::now(),
        catalog,
        indexes,
    })?;
    let compressed = lz4_flex::compress_prepend_size(&payload);

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut out = Vec::with_capacity(4 + compressed.len());
    out.extend_from_slice(&checksum.to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}
