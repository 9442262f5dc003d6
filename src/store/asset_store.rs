use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::{IndexStatus, StorageStats};
use crate::core::types::{Asset, AssetId, UserId};
use crate::index::Indexer;
use crate::index::index_set::IndexSet;
use crate::query::options::{SearchOptions, SortKey, SortOrder};
use crate::query::planner::{plan, CandidatePlan};
use crate::search::executor::{execute, sort_assets};
use crate::search::results::SearchResults;
use crate::storage::asset_cache::AssetCache;
use crate::storage::layout::StorageLayout;
use crate::storage::repository::{AssetRepository, FlatFileStore, SnapshotStore};
use crate::storage::snapshot::{encode_parts, IndexSnapshot};
use crate::update::asset_update::{AssetUpdate, ASSET_UPDATER};
use crate::update::updater::dedup_preserving_order;

/// Outcome of a batch update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    pub updated: Vec<AssetId>,
    /// Requested ids with no record; left alone.
    pub skipped: Vec<AssetId>,
}

/// Authoritative asset records of one user, with the cache and secondary
/// indexes that front them.
///
/// Reads take `&self` (the cache has its own mutex); every mutation takes
/// `&mut self`, so the owner's lock decides exclusivity.
pub struct AssetStore {
    user_id: UserId,
    config: Config,
    repository: Arc<dyn AssetRepository>,
    snapshots: Arc<dyn SnapshotStore>,
    cache: AssetCache,
    catalog: BTreeMap<AssetId, String>,  // id -> filename of every live record
    indexes: IndexSet,
    last_id: u32,
    dirty: bool,
    uploads: VecDeque<DateTime<Utc>>,
    orphans_removed: usize,
    last_rebuild: Option<DateTime<Utc>>,
    last_save: Option<DateTime<Utc>>,
}

impl AssetStore {
    /// Opens the flat-file store under `layout`.
    pub fn open(user_id: UserId, layout: Arc<StorageLayout>, config: Config) -> Result<Self> {
        let backend = Arc::new(FlatFileStore::new(layout));
        Self::with_backend(user_id, config, backend.clone(), backend)
    }

    pub fn with_backend(
        user_id: UserId,
        config: Config,
        repository: Arc<dyn AssetRepository>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Result<Self> {
        let mut store = AssetStore {
            user_id,
            cache: AssetCache::new(config.cache_size),
            config,
            repository,
            snapshots,
            catalog: BTreeMap::new(),
            indexes: IndexSet::new(),
            last_id: 0,
            dirty: false,
            uploads: VecDeque::new(),
            orphans_removed: 0,
            last_rebuild: None,
            last_save: None,
        };

        match store.load_snapshot() {
            Ok(true) => {
                log::info!(
                    "Loaded index snapshot for user {} ({} assets)",
                    user_id,
                    store.catalog.len()
                );
            }
            Ok(false) => {
                store.rebuild_index()?;
            }
            Err(e) => {
                log::warn!("Index snapshot for user {} unusable, rebuilding: {}", user_id, e);
                store.rebuild_index()?;
            }
        }
        Ok(store)
    }

    /// `Ok(false)` when there is no snapshot or it no longer matches the records.
    fn load_snapshot(&mut self) -> Result<bool> {
        let Some(bytes) = self.snapshots.load_snapshot()? else {
            return Ok(false);
        };
        let snapshot = IndexSnapshot::decode(&bytes)?;
        // Ids are never reused, even when the rest of the snapshot is dropped.
        self.last_id = self.last_id.max(snapshot.last_id);

        let on_disk = self.repository.record_ids()?;
        if on_disk.len() != snapshot.catalog.len()
            || on_disk.iter().any(|id| !snapshot.catalog.contains_key(id))
        {
            log::warn!(
                "Index snapshot for user {} is stale ({} indexed, {} on disk)",
                self.user_id,
                snapshot.catalog.len(),
                on_disk.len()
            );
            return Ok(false);
        }

        self.catalog = snapshot.catalog;
        self.indexes = snapshot.indexes;
        self.last_save = Some(snapshot.created_at);
        self.dirty = false;
        Ok(true)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.catalog.contains_key(&id)
    }

    pub fn indexes(&self) -> &IndexSet {
        &self.indexes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: AssetId) -> Result<Arc<Asset>> {
        if !self.catalog.contains_key(&id) {
            return Err(Error::not_found(format!("asset {}", id)));
        }
        if let Some(asset) = self.cache.get(id) {
            return Ok(asset);
        }
        let asset = Arc::new(self.repository.load(id)?);
        self.cache.put(id, asset.clone());
        Ok(asset)
    }

    /// Like [`get`](Self::get) but tolerates a record vanishing underneath the
    /// catalog, which orphan cleanup will pick up later.
    fn fetch(&self, id: AssetId) -> Result<Option<Arc<Asset>>> {
        match self.get(id) {
            Ok(asset) => Ok(Some(asset)),
            Err(e) if e.is_not_found() => {
                log::debug!("Asset {} listed but not loadable, skipping", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn fetch_many<I>(&self, ids: I) -> Result<Vec<Arc<Asset>>>
    where
        I: IntoIterator<Item = AssetId>,
    {
        let mut assets = Vec::new();
        for id in ids {
            if let Some(asset) = self.fetch(id)? {
                assets.push(asset);
            }
        }
        Ok(assets)
    }

    /// Assigns the next id and persists the record.
    pub fn create(&mut self, mut asset: Asset) -> Result<Arc<Asset>> {
        if asset.file_size > self.config.max_upload_size {
            return Err(Error::new(
                ErrorKind::FileTooLarge,
                format!(
                    "{} is {} bytes, limit is {}",
                    asset.filename, asset.file_size, self.config.max_upload_size
                ),
            ));
        }

        let id = self.last_id.checked_add(1).ok_or_else(|| {
            Error::new(ErrorKind::Internal, "asset id space exhausted".to_string())
        })?;
        asset.id = AssetId(id);
        asset.user_id = self.user_id;
        dedup_preserving_order(&mut asset.albums);
        dedup_preserving_order(&mut asset.trips);
        dedup_preserving_order(&mut asset.persons);

        self.repository.save(&asset)?;
        self.last_id = id;

        let asset = Arc::new(asset);
        self.catalog.insert(asset.id, asset.filename.clone());
        self.indexes.add(&asset);
        self.cache.put(asset.id, asset.clone());
        self.uploads.push_back(Utc::now());
        self.dirty = true;

        log::debug!("Created asset {} for user {}", asset.id, self.user_id);
        Ok(asset)
    }

    /// Applies `request` to every id it lists. Unknown ids, and records whose
    /// file vanished underneath the catalog, are skipped.
    pub fn update(&mut self, request: &AssetUpdate) -> Result<UpdateSummary> {
        let mut summary = UpdateSummary::default();
        for &id in &request.asset_ids {
            if !self.catalog.contains_key(&id) {
                summary.skipped.push(id);
                continue;
            }
            match self.update_asset(id, request) {
                Ok(_) => summary.updated.push(id),
                Err(e) if e.is_not_found() => {
                    log::warn!("Asset {} listed but not loadable, skipping update", id);
                    summary.skipped.push(id);
                }
                Err(e) => return Err(e),
            }
        }
        if !summary.skipped.is_empty() {
            log::debug!("Update skipped {} unknown asset ids", summary.skipped.len());
        }
        Ok(summary)
    }

    /// Single-record update; `request.asset_ids` is ignored.
    pub fn update_asset(&mut self, id: AssetId, request: &AssetUpdate) -> Result<Arc<Asset>> {
        let current = self.get(id)?;
        let mut asset = Asset::clone(&current);
        ASSET_UPDATER.apply(&mut asset, request);
        asset.id = id;

        self.repository.save(&asset)?;

        let asset = Arc::new(asset);
        self.indexes.remove(id);
        self.indexes.add(&asset);
        self.catalog.insert(id, asset.filename.clone());
        self.cache.put(id, asset.clone());
        self.dirty = true;
        Ok(asset)
    }

    pub fn delete(&mut self, id: AssetId) -> Result<()> {
        if !self.catalog.contains_key(&id) {
            return Err(Error::not_found(format!("asset {}", id)));
        }
        self.purge(id)?;
        log::debug!("Deleted asset {} for user {}", id, self.user_id);
        Ok(())
    }

    fn purge(&mut self, id: AssetId) -> Result<()> {
        match self.repository.delete(id) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        self.catalog.remove(&id);
        self.indexes.remove(id);
        self.cache.remove(id);
        self.dirty = true;
        Ok(())
    }

    /// Every asset in id order.
    pub fn get_all(&self) -> Result<Vec<Arc<Asset>>> {
        self.fetch_many(self.catalog.keys().copied())
    }

    /// Unknown sort keys leave the id order untouched.
    pub fn get_all_sorted(&self, sort_by: &str, order: SortOrder) -> Result<Vec<Arc<Asset>>> {
        let mut assets = self.get_all()?;
        if let Some(key) = SortKey::parse(sort_by) {
            sort_assets(&mut assets, key, order);
        }
        Ok(assets)
    }

    pub fn search(&self, options: &SearchOptions) -> Result<SearchResults> {
        let candidates = match plan(options, &self.indexes) {
            CandidatePlan::FullScan => self.get_all()?,
            CandidatePlan::Ids(ids) => {
                self.fetch_many(ids.iter().map(AssetId).filter(|id| self.catalog.contains_key(id)))?
            }
        };
        Ok(execute(options, candidates))
    }

    /// Number of assets matching `options`, ignoring its paging.
    pub fn count(&self, options: &SearchOptions) -> Result<usize> {
        Ok(self.search(options)?.total)
    }

    /// Writes the index snapshot when something changed since the last save.
    pub fn persist_if_dirty(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save_index()?;
        Ok(true)
    }

    pub fn save_index(&mut self) -> Result<()> {
        let bytes = encode_parts(self.last_id, &self.catalog, &self.indexes)?;
        self.snapshots.save_snapshot(&bytes)?;
        self.dirty = false;
        self.last_save = Some(Utc::now());
        log::debug!(
            "Saved index snapshot for user {} ({} bytes)",
            self.user_id,
            bytes.len()
        );
        Ok(())
    }

    /// Drops every in-memory structure and rebuilds it from a full record scan.
    pub fn rebuild_index(&mut self) -> Result<usize> {
        let assets = self.repository.load_all()?;

        self.cache.clear();
        self.catalog = assets.iter().map(|a| (a.id, a.filename.clone())).collect();
        self.indexes = IndexSet::rebuild(assets.iter());
        let max_id = assets.iter().map(|a| a.id.0).max().unwrap_or(0);
        self.last_id = self.last_id.max(max_id);

        // Warm the cache with the newest records.
        for asset in assets.into_iter().rev().take(self.cache.capacity()) {
            self.cache.put(asset.id, Arc::new(asset));
        }

        self.dirty = true;
        self.last_rebuild = Some(Utc::now());
        log::info!(
            "Rebuilt index for user {}: {} assets",
            self.user_id,
            self.catalog.len()
        );
        Ok(self.catalog.len())
    }

    /// Forgets uploads older than 24 hours.
    pub fn reset_rolling_counters(&mut self) {
        let cutoff = Utc::now() - Duration::hours(24);
        while self.uploads.front().is_some_and(|t| *t < cutoff) {
            self.uploads.pop_front();
        }
    }

    /// Purges every record whose media file is gone.
    pub fn cleanup_orphans(&mut self) -> Result<usize> {
        let orphans: Vec<AssetId> = self
            .catalog
            .iter()
            .filter(|(_, filename)| !self.repository.asset_file_exists(filename))
            .map(|(id, _)| *id)
            .collect();

        for id in &orphans {
            self.purge(*id)?;
        }
        if !orphans.is_empty() {
            self.orphans_removed += orphans.len();
            log::info!(
                "Removed {} orphaned assets for user {}",
                orphans.len(),
                self.user_id
            );
        }
        Ok(orphans.len())
    }

    pub fn stats(&self) -> StorageStats {
        let cache = self.cache.stats();
        let cutoff = Utc::now() - Duration::hours(24);
        StorageStats {
            total_assets: self.catalog.len(),
            cache_size: cache.size,
            cache_hits: cache.hit_count,
            cache_misses: cache.miss_count,
            uploads_24h: self.uploads.iter().filter(|t| **t >= cutoff).count(),
            orphans_removed: self.orphans_removed,
        }
    }

    pub fn index_status(&self) -> IndexStatus {
        IndexStatus {
            last_rebuild: self.last_rebuild,
            last_save: self.last_save,
            asset_count: self.indexes.len(),
            text_index_size: self.indexes.text.key_count(),
            date_index_size: self.indexes.date.key_count(),
            dirty: self.dirty,
        }
    }

    /// Flushes a dirty index; the store stays usable afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.persist_if_dirty()?;
        Ok(())
    }
}
