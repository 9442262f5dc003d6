pub mod model;
pub mod manager;
pub mod camera;

pub use camera::CameraCollection;
pub use manager::{CollectionManager, CollectionSortKey};
pub use model::{
    Album, AlbumUpdate, CollectionItem, Person, PersonUpdate, Pinned, PinnedKind, PinnedUpdate,
    SharedAlbum, SharedAlbumUpdate, Trip, TripUpdate, Village, VillageUpdate,
};
