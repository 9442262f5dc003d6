pub mod updater;
pub mod asset_update;

pub use asset_update::{AssetUpdate, ASSET_UPDATER};
pub use updater::{apply_collection_update, dedup_preserving_order, set_if_some, CollectionUpdate, Updater};
