use std::sync::Arc;
use parking_lot::RwLock;
use crate::collection::camera::{synthesize, CameraCollection};
use crate::collection::manager::CollectionManager;
use crate::collection::model::{
    Album, CollectionItem, Person, Pinned, PinnedKind, SharedAlbum, Trip, Village,
};
use crate::core::config::{Config, PreviewSizes};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::{IndexStatus, StorageStats};
use crate::core::types::{Asset, AssetId, CollectionId, UserId};
use crate::query::options::{SearchOptions, SortOrder};
use crate::search::results::SearchResults;
use crate::storage::layout::StorageLayout;
use crate::store::asset_store::{AssetStore, UpdateSummary};
use crate::store::maintenance::{Maintainable, MaintenanceHandle, MaintenanceSchedule};
use crate::update::asset_update::AssetUpdate;

pub type SharedVillages = Arc<RwLock<CollectionManager<Village>>>;

/// Everything one user owns, guarded as a unit by the library lock.
pub struct LibraryState {
    pub assets: AssetStore,
    pub albums: CollectionManager<Album>,
    pub trips: CollectionManager<Trip>,
    pub persons: CollectionManager<Person>,
    pub shared_albums: CollectionManager<SharedAlbum>,
    pub pinned: CollectionManager<Pinned>,
    cameras: Vec<CameraCollection>,
    preview: PreviewSizes,
}

impl LibraryState {
    pub fn open(user_id: UserId, config: &Config) -> Result<Self> {
        let layout = Arc::new(StorageLayout::for_user(&config.storage_path, user_id)?);
        let data_dir = layout.data_dir.clone();
        let assets = AssetStore::open(user_id, layout, config.clone())?;

        Ok(LibraryState {
            assets,
            albums: CollectionManager::open(&data_dir)?,
            trips: CollectionManager::open(&data_dir)?,
            persons: CollectionManager::open(&data_dir)?,
            shared_albums: CollectionManager::open(&data_dir)?,
            pinned: CollectionManager::open(&data_dir)?,
            cameras: Vec::new(),
            preview: config.preview,
        })
    }

    /// Pinned album tiles take their referenced album's title.
    fn sync_pinned_titles(&mut self) -> Result<usize> {
        let albums = &self.albums;
        self.pinned.refresh_with(|pinned| {
            if pinned.kind != PinnedKind::Album {
                return false;
            }
            match albums.get(pinned.album_id) {
                Ok(album) if album.title != pinned.title => {
                    pinned.title = album.title;
                    true
                }
                _ => false,
            }
        })
    }

    /// Re-derives counts, previews and camera groupings from the asset store.
    pub fn recompute_collections(&mut self) -> Result<()> {
        self.sync_pinned_titles()?;

        let sizes = self.preview;
        self.albums.recompute(&self.assets, &sizes)?;
        self.trips.recompute(&self.assets, &sizes)?;
        self.persons.recompute(&self.assets, &sizes)?;
        self.shared_albums.recompute(&self.assets, &sizes)?;
        self.pinned.recompute(&self.assets, &sizes)?;
        self.cameras = synthesize(&self.assets, sizes.camera)?;
        Ok(())
    }

    pub fn cameras(&self) -> &[CameraCollection] {
        &self.cameras
    }
}

/// Collection kinds owned by a [`LibraryState`].
pub trait LibraryCollection: CollectionItem {
    fn manager(state: &LibraryState) -> &CollectionManager<Self>;
    fn manager_mut(state: &mut LibraryState) -> &mut CollectionManager<Self>;
}

macro_rules! library_collection {
    ($kind:ty, $field:ident) => {
        impl LibraryCollection for $kind {
            fn manager(state: &LibraryState) -> &CollectionManager<Self> {
                &state.$field
            }

            fn manager_mut(state: &mut LibraryState) -> &mut CollectionManager<Self> {
                &mut state.$field
            }
        }
    };
}

library_collection!(Album, albums);
library_collection!(Trip, trips);
library_collection!(Person, persons);
library_collection!(SharedAlbum, shared_albums);
library_collection!(Pinned, pinned);

impl Maintainable for RwLock<LibraryState> {
    fn persist_if_dirty(&self) -> Result<bool> {
        self.write().assets.persist_if_dirty()
    }

    fn rebuild(&self) -> Result<usize> {
        let mut state = self.write();
        let n = state.assets.rebuild_index()?;
        state.recompute_collections()?;
        Ok(n)
    }

    fn reset_stats(&self) {
        self.write().assets.reset_rolling_counters();
    }

    fn cleanup_orphans(&self) -> Result<usize> {
        let mut state = self.write();
        let n = state.assets.cleanup_orphans()?;
        if n > 0 {
            state.recompute_collections()?;
        }
        Ok(n)
    }

    fn name(&self) -> String {
        format!("user {}", self.read().assets.user_id())
    }
}

/// One user's library: asset store and collection managers behind a single
/// read/write lock, plus the background maintenance loop.
pub struct UserLibrary {
    user_id: UserId,
    state: Arc<RwLock<LibraryState>>,
    villages: SharedVillages,
    maintenance: Option<MaintenanceHandle>,
}

impl UserLibrary {
    pub fn open(user_id: UserId, config: &Config, villages: SharedVillages) -> Result<Self> {
        if user_id.0 == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "user id 0 is not a valid user".to_string(),
            ));
        }

        let mut state = LibraryState::open(user_id, config)?;
        state.recompute_collections()?;
        let state = Arc::new(RwLock::new(state));

        let maintenance = if config.maintenance_enabled {
            let target: Arc<dyn Maintainable> = state.clone();
            Some(MaintenanceHandle::start(target, MaintenanceSchedule::from_config(config)))
        } else {
            None
        };

        log::info!("Opened library for user {}", user_id);
        Ok(UserLibrary {
            user_id,
            state,
            villages,
            maintenance,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Direct access to the guarded state for callers composing several
    /// operations under one lock.
    pub fn state(&self) -> &Arc<RwLock<LibraryState>> {
        &self.state
    }

    pub fn is_maintained(&self) -> bool {
        self.maintenance.as_ref().is_some_and(|m| m.is_running())
    }

    // Assets

    pub fn get_asset(&self, id: AssetId) -> Result<Arc<Asset>> {
        self.state.read().assets.get(id)
    }

    // Every mutation recomputes collections under the same write guard, so
    // readers never see counts or previews that lag the asset store.

    pub fn create_asset(&self, asset: Asset) -> Result<Arc<Asset>> {
        let mut state = self.state.write();
        let created = state.assets.create(asset)?;
        state.recompute_collections()?;
        Ok(created)
    }

    pub fn update_assets(&self, request: &AssetUpdate) -> Result<UpdateSummary> {
        let mut state = self.state.write();
        let summary = state.assets.update(request)?;
        if !summary.updated.is_empty() {
            state.recompute_collections()?;
        }
        Ok(summary)
    }

    pub fn update_asset(&self, id: AssetId, request: &AssetUpdate) -> Result<Arc<Asset>> {
        let mut state = self.state.write();
        let updated = state.assets.update_asset(id, request)?;
        state.recompute_collections()?;
        Ok(updated)
    }

    pub fn delete_asset(&self, id: AssetId) -> Result<()> {
        let mut state = self.state.write();
        state.assets.delete(id)?;
        state.recompute_collections()
    }

    pub fn get_all_assets(&self) -> Result<Vec<Arc<Asset>>> {
        self.state.read().assets.get_all()
    }

    pub fn get_all_assets_sorted(&self, sort_by: &str, order: SortOrder) -> Result<Vec<Arc<Asset>>> {
        self.state.read().assets.get_all_sorted(sort_by, order)
    }

    pub fn search(&self, options: &SearchOptions) -> Result<SearchResults> {
        self.state.read().assets.search(options)
    }

    pub fn stats(&self) -> StorageStats {
        self.state.read().assets.stats()
    }

    pub fn index_status(&self) -> IndexStatus {
        self.state.read().assets.index_status()
    }

    pub fn rebuild_index(&self) -> Result<usize> {
        let mut state = self.state.write();
        let n = state.assets.rebuild_index()?;
        state.recompute_collections()?;
        Ok(n)
    }

    pub fn recompute_collections(&self) -> Result<()> {
        self.state.write().recompute_collections()
    }

    // Collections

    /// Returns the stored item with its derived fields filled in.
    pub fn create_collection<T: LibraryCollection>(&self, item: T) -> Result<T> {
        let mut state = self.state.write();
        let id = T::manager_mut(&mut state).create(item)?.id();
        state.recompute_collections()?;
        T::manager(&state).get(id)
    }

    pub fn get_collection<T: LibraryCollection>(&self, id: CollectionId) -> Result<T> {
        T::manager(&self.state.read()).get(id)
    }

    pub fn update_collection<T: LibraryCollection>(
        &self,
        id: CollectionId,
        request: &T::Update,
    ) -> Result<T> {
        let mut state = self.state.write();
        T::manager_mut(&mut state).update(id, request)?;
        state.recompute_collections()?;
        T::manager(&state).get(id)
    }

    pub fn delete_collection<T: LibraryCollection>(&self, id: CollectionId) -> Result<()> {
        let mut state = self.state.write();
        T::manager_mut(&mut state).delete(id)?;
        state.recompute_collections()
    }

    pub fn collections<T: LibraryCollection>(&self) -> Vec<T> {
        T::manager(&self.state.read()).get_all()
    }

    pub fn collections_sorted<T: LibraryCollection>(&self, sort_by: &str, order: SortOrder) -> Vec<T> {
        T::manager(&self.state.read()).get_all_sorted(sort_by, order)
    }

    pub fn collection_preview<T: LibraryCollection>(&self, id: CollectionId) -> Vec<Arc<Asset>> {
        T::manager(&self.state.read()).preview(id)
    }

    pub fn cameras(&self) -> Vec<CameraCollection> {
        self.state.read().cameras().to_vec()
    }

    pub fn villages(&self) -> Vec<Village> {
        self.villages.read().get_all()
    }

    pub fn village(&self, id: CollectionId) -> Result<Village> {
        self.villages.read().get(id)
    }

    /// Stops maintenance and flushes the index. Safe to call more than once.
    pub fn close(&self) -> Result<()> {
        if let Some(maintenance) = &self.maintenance {
            maintenance.stop()?;
        }
        self.state.write().assets.close()?;
        log::info!("Closed library for user {}", self.user_id);
        Ok(())
    }
}

impl std::fmt::Debug for UserLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLibrary")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl Drop for UserLibrary {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Closing library for user {} failed: {}", self.user_id, e);
        }
    }
}
