use std::sync::LazyLock;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::core::types::{Asset, AssetId, CollectionId, MediaType};
use crate::update::updater::{apply_collection_update, set_if_some, CollectionUpdate, Updater};

/// Partial update for one or more assets. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetUpdate {
    pub asset_ids: Vec<AssetId>,

    pub filename: Option<String>,
    pub media_type: Option<MediaType>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub is_camera: Option<bool>,
    pub is_favorite: Option<bool>,
    pub is_screenshot: Option<bool>,
    pub is_hidden: Option<bool>,

    pub albums: Option<Vec<CollectionId>>,
    pub add_albums: Vec<CollectionId>,
    pub remove_albums: Vec<CollectionId>,

    pub trips: Option<Vec<CollectionId>>,
    pub add_trips: Vec<CollectionId>,
    pub remove_trips: Vec<CollectionId>,

    pub persons: Option<Vec<CollectionId>>,
    pub add_persons: Vec<CollectionId>,
    pub remove_persons: Vec<CollectionId>,
}

impl AssetUpdate {
    pub fn for_assets(ids: impl IntoIterator<Item = AssetId>) -> Self {
        AssetUpdate {
            asset_ids: ids.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn favorite(mut self, value: bool) -> Self {
        self.is_favorite = Some(value);
        self
    }

    pub fn hidden(mut self, value: bool) -> Self {
        self.is_hidden = Some(value);
        self
    }

    pub fn add_albums(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.add_albums.extend(ids);
        self
    }

    pub fn remove_albums(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.remove_albums.extend(ids);
        self
    }

    pub fn replace_albums(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.albums = Some(ids.into_iter().collect());
        self
    }

    pub fn add_trips(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.add_trips.extend(ids);
        self
    }

    pub fn add_persons(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.add_persons.extend(ids);
        self
    }
}

pub static ASSET_UPDATER: LazyLock<Updater<Asset, AssetUpdate>> = LazyLock::new(|| {
    Updater::<Asset, AssetUpdate>::new()
        .scalar(|a, u| set_if_some(&mut a.filename, &u.filename))
        .scalar(|a, u| set_if_some(&mut a.media_type, &u.media_type))
        .scalar(|a, u| set_if_some(&mut a.camera_make, &u.camera_make))
        .scalar(|a, u| set_if_some(&mut a.camera_model, &u.camera_model))
        .scalar(|a, u| set_if_some(&mut a.is_camera, &u.is_camera))
        .scalar(|a, u| set_if_some(&mut a.is_favorite, &u.is_favorite))
        .scalar(|a, u| set_if_some(&mut a.is_screenshot, &u.is_screenshot))
        .scalar(|a, u| set_if_some(&mut a.is_hidden, &u.is_hidden))
        .collection(|a, u| {
            apply_collection_update(
                &mut a.albums,
                CollectionUpdate::new(u.albums.as_deref(), &u.add_albums, &u.remove_albums),
            )
        })
        .collection(|a, u| {
            apply_collection_update(
                &mut a.trips,
                CollectionUpdate::new(u.trips.as_deref(), &u.add_trips, &u.remove_trips),
            )
        })
        .collection(|a, u| {
            apply_collection_update(
                &mut a.persons,
                CollectionUpdate::new(u.persons.as_deref(), &u.add_persons, &u.remove_persons),
            )
        })
        .post_update(|a| a.modification_date = Utc::now())
});
