pub mod asset_store;
pub mod maintenance;

pub use asset_store::{AssetStore, UpdateSummary};
pub use maintenance::{Maintainable, MaintenanceHandle, MaintenanceSchedule};
