use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::{Mutex, RwLock};
use crate::collection::manager::CollectionManager;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::UserId;
use crate::imaging::{ImageLoader, ImageVariant};
use crate::library::{SharedVillages, UserLibrary};
use crate::storage::layout::StorageLayout;

/// Per-user open slot. Opening happens under the slot's lock only, so one
/// user's open never blocks another user.
type LibrarySlot = Arc<Mutex<Option<Arc<UserLibrary>>>>;

/// Lazily opened libraries keyed by user, plus the data every user shares.
pub struct LibraryRegistry {
    config: Config,
    libraries: RwLock<HashMap<UserId, LibrarySlot>>,
    villages: SharedVillages,
    images: Option<Arc<dyn ImageLoader>>,
}

impl LibraryRegistry {
    pub fn new(config: Config) -> Result<Self> {
        let shared_dir = StorageLayout::shared_data_dir(&config.storage_path)?;
        let villages = Arc::new(RwLock::new(CollectionManager::open(&shared_dir)?));

        Ok(LibraryRegistry {
            config,
            libraries: RwLock::new(HashMap::new()),
            villages,
            images: None,
        })
    }

    pub fn with_image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.images = Some(loader);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens the user's library on first use; later calls share it.
    pub fn get_or_open(&self, user_id: UserId) -> Result<Arc<UserLibrary>> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock();
        if let Some(library) = slot.as_ref() {
            return Ok(library.clone());
        }
        // A failed open leaves the slot empty for the next caller to retry.
        let library = Arc::new(UserLibrary::open(user_id, &self.config, self.villages.clone())?);
        *slot = Some(library.clone());
        Ok(library)
    }

    fn slot(&self, user_id: UserId) -> LibrarySlot {
        if let Some(slot) = self.libraries.read().get(&user_id) {
            return slot.clone();
        }
        self.libraries.write().entry(user_id).or_default().clone()
    }

    pub fn get(&self, user_id: UserId) -> Option<Arc<UserLibrary>> {
        let slot = self.libraries.read().get(&user_id)?.clone();
        let library = slot.lock().clone();
        library
    }

    pub fn open_users(&self) -> Vec<UserId> {
        let slots: Vec<(UserId, LibrarySlot)> = self
            .libraries
            .read()
            .iter()
            .map(|(user, slot)| (*user, slot.clone()))
            .collect();
        let mut users: Vec<UserId> = slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().is_some())
            .map(|(user, _)| user)
            .collect();
        users.sort();
        users
    }

    /// Tears down one user's library. `Ok(false)` when it was not open.
    pub fn remove_library(&self, user_id: UserId) -> Result<bool> {
        let Some(slot) = self.libraries.write().remove(&user_id) else {
            return Ok(false);
        };
        let removed = slot.lock().take();
        match removed {
            Some(library) => {
                library.close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Closes every open library, reporting the first failure after trying
    /// them all.
    pub fn shutdown(&self) -> Result<()> {
        let slots: Vec<LibrarySlot> =
            self.libraries.write().drain().map(|(_, slot)| slot).collect();
        let libraries: Vec<Arc<UserLibrary>> =
            slots.iter().filter_map(|slot| slot.lock().take()).collect();

        let mut first_error = None;
        for library in libraries {
            if let Err(e) = library.close() {
                log::warn!("Failed to close library for user {}: {}", library.user_id(), e);
                first_error.get_or_insert(e);
            }
        }
        log::info!("Library registry shut down");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Global village records, editable by administrators.
    pub fn villages(&self) -> &SharedVillages {
        &self.villages
    }

    pub fn load_image(&self, user_id: UserId, filename: &str, variant: ImageVariant) -> Result<Vec<u8>> {
        let Some(loader) = &self.images else {
            return Err(Error::new(
                ErrorKind::Internal,
                "no image loader configured".to_string(),
            ));
        };
        if variant != ImageVariant::Icon && user_id.0 == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "user id 0 is not a valid user".to_string(),
            ));
        }
        loader.load(user_id, filename, variant)
    }

    pub fn original_image(&self, user_id: UserId, filename: &str) -> Result<Vec<u8>> {
        self.load_image(user_id, filename, ImageVariant::Original)
    }

    pub fn tiny_image(&self, user_id: UserId, filename: &str) -> Result<Vec<u8>> {
        self.load_image(user_id, filename, ImageVariant::Tiny)
    }

    pub fn icon(&self, filename: &str) -> Result<Vec<u8>> {
        self.load_image(UserId(0), filename, ImageVariant::Icon)
    }
}

impl Drop for LibraryRegistry {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Registry shutdown failed: {}", e);
        }
    }
}
