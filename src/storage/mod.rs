pub mod layout;
pub mod asset_cache;
pub mod repository;
pub mod snapshot;
