use std::sync::LazyLock;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::core::config::PreviewSizes;
use crate::core::types::{CollectionId, MediaType};
use crate::query::options::SearchOptions;
use crate::update::updater::{set_if_some, Updater};

/// A persisted grouping of assets managed by a
/// [`CollectionManager`](crate::collection::manager::CollectionManager).
pub trait CollectionItem: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// File stem of the kind's JSON document.
    const KIND: &'static str;

    type Update: Send + Sync + 'static;

    fn id(&self) -> CollectionId;
    fn set_id(&mut self, id: CollectionId);

    fn creation_date(&self) -> DateTime<Utc>;
    fn modification_date(&self) -> DateTime<Utc>;
    /// Stamps both timestamps on creation.
    fn set_dates(&mut self, now: DateTime<Utc>);

    fn title(&self) -> &str;

    fn count(&self) -> usize {
        0
    }

    /// Written back by recompute; not a user edit, so timestamps stay.
    fn set_count(&mut self, _count: usize) {}

    /// Filter selecting the member assets, `None` for kinds without a preview.
    fn preview_query(&self) -> Option<SearchOptions> {
        None
    }

    fn preview_limit(_sizes: &PreviewSizes) -> usize {
        0
    }

    fn updater() -> &'static Updater<Self, Self::Update>;
}

macro_rules! impl_record_basics {
    () => {
        fn id(&self) -> CollectionId {
            self.id
        }

        fn set_id(&mut self, id: CollectionId) {
            self.id = id;
        }

        fn creation_date(&self) -> DateTime<Utc> {
            self.creation_date
        }

        fn modification_date(&self) -> DateTime<Utc> {
            self.modification_date
        }

        fn set_dates(&mut self, now: DateTime<Utc>) {
            self.creation_date = now;
            self.modification_date = now;
        }
    };
}

// ---------------------------------------------------------------------------
// Album

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: CollectionId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub is_hidden: bool,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
}

impl Album {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Album {
            id: 0,
            title: title.into(),
            subtitle: String::new(),
            album_type: String::new(),
            count: 0,
            is_collection: false,
            is_hidden: false,
            creation_date: now,
            modification_date: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlbumUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub album_type: Option<String>,
    pub is_collection: Option<bool>,
    pub is_hidden: Option<bool>,
}

static ALBUM_UPDATER: LazyLock<Updater<Album, AlbumUpdate>> = LazyLock::new(|| {
    Updater::<Album, AlbumUpdate>::new()
        .scalar(|a, u| set_if_some(&mut a.title, &u.title))
        .scalar(|a, u| set_if_some(&mut a.subtitle, &u.subtitle))
        .scalar(|a, u| set_if_some(&mut a.album_type, &u.album_type))
        .scalar(|a, u| set_if_some(&mut a.is_collection, &u.is_collection))
        .scalar(|a, u| set_if_some(&mut a.is_hidden, &u.is_hidden))
        .post_update(|a| a.modification_date = Utc::now())
});

impl CollectionItem for Album {
    const KIND: &'static str = "albums";
    type Update = AlbumUpdate;

    impl_record_basics!();

    fn title(&self) -> &str {
        &self.title
    }

    fn count(&self) -> usize {
        self.count
    }

    fn set_count(&mut self, count: usize) {
        self.count = count;
    }

    fn preview_query(&self) -> Option<SearchOptions> {
        Some(SearchOptions::new().in_albums([self.id]))
    }

    fn preview_limit(sizes: &PreviewSizes) -> usize {
        sizes.album
    }

    fn updater() -> &'static Updater<Self, Self::Update> {
        &ALBUM_UPDATER
    }
}

// ---------------------------------------------------------------------------
// Trip

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: CollectionId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub trip_type: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub is_collection: bool,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
}

impl Trip {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Trip {
            id: 0,
            title: title.into(),
            subtitle: String::new(),
            trip_type: String::new(),
            count: 0,
            is_collection: false,
            creation_date: now,
            modification_date: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub trip_type: Option<String>,
    pub is_collection: Option<bool>,
}

static TRIP_UPDATER: LazyLock<Updater<Trip, TripUpdate>> = LazyLock::new(|| {
    Updater::<Trip, TripUpdate>::new()
        .scalar(|t, u| set_if_some(&mut t.title, &u.title))
        .scalar(|t, u| set_if_some(&mut t.subtitle, &u.subtitle))
        .scalar(|t, u| set_if_some(&mut t.trip_type, &u.trip_type))
        .scalar(|t, u| set_if_some(&mut t.is_collection, &u.is_collection))
        .post_update(|t| t.modification_date = Utc::now())
});

impl CollectionItem for Trip {
    const KIND: &'static str = "trips";
    type Update = TripUpdate;

    impl_record_basics!();

    fn title(&self) -> &str {
        &self.title
    }

    fn count(&self) -> usize {
        self.count
    }

    fn set_count(&mut self, count: usize) {
        self.count = count;
    }

    fn preview_query(&self) -> Option<SearchOptions> {
        Some(SearchOptions::new().in_trips([self.id]))
    }

    fn preview_limit(sizes: &PreviewSizes) -> usize {
        sizes.trip
    }

    fn updater() -> &'static Updater<Self, Self::Update> {
        &TRIP_UPDATER
    }
}

// ---------------------------------------------------------------------------
// Person

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: CollectionId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub is_collection: bool,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
}

impl Person {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Person {
            id: 0,
            title: title.into(),
            subtitle: String::new(),
            count: 0,
            is_collection: false,
            creation_date: now,
            modification_date: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub is_collection: Option<bool>,
}

static PERSON_UPDATER: LazyLock<Updater<Person, PersonUpdate>> = LazyLock::new(|| {
    Updater::<Person, PersonUpdate>::new()
        .scalar(|p, u| set_if_some(&mut p.title, &u.title))
        .scalar(|p, u| set_if_some(&mut p.subtitle, &u.subtitle))
        .scalar(|p, u| set_if_some(&mut p.is_collection, &u.is_collection))
        .post_update(|p| p.modification_date = Utc::now())
});

impl CollectionItem for Person {
    const KIND: &'static str = "persons";
    type Update = PersonUpdate;

    impl_record_basics!();

    fn title(&self) -> &str {
        &self.title
    }

    fn count(&self) -> usize {
        self.count
    }

    fn set_count(&mut self, count: usize) {
        self.count = count;
    }

    fn preview_query(&self) -> Option<SearchOptions> {
        Some(SearchOptions::new().in_persons([self.id]))
    }

    fn preview_limit(sizes: &PreviewSizes) -> usize {
        sizes.person
    }

    fn updater() -> &'static Updater<Self, Self::Update> {
        &PERSON_UPDATER
    }
}

// ---------------------------------------------------------------------------
// Shared album

/// Assets carry no shared-album membership, so there is nothing to preview
/// and the count is whatever the owner last stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAlbum {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub is_hidden: bool,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
}

impl SharedAlbum {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        SharedAlbum {
            id: 0,
            name: name.into(),
            album_type: String::new(),
            count: 0,
            is_collection: false,
            is_hidden: false,
            creation_date: now,
            modification_date: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedAlbumUpdate {
    pub name: Option<String>,
    pub album_type: Option<String>,
    pub is_collection: Option<bool>,
    pub is_hidden: Option<bool>,
}

static SHARED_ALBUM_UPDATER: LazyLock<Updater<SharedAlbum, SharedAlbumUpdate>> =
    LazyLock::new(|| {
        Updater::<SharedAlbum, SharedAlbumUpdate>::new()
            .scalar(|s, u| set_if_some(&mut s.name, &u.name))
            .scalar(|s, u| set_if_some(&mut s.album_type, &u.album_type))
            .scalar(|s, u| set_if_some(&mut s.is_collection, &u.is_collection))
            .scalar(|s, u| set_if_some(&mut s.is_hidden, &u.is_hidden))
            .post_update(|s| s.modification_date = Utc::now())
    });

impl CollectionItem for SharedAlbum {
    const KIND: &'static str = "shared_albums";
    type Update = SharedAlbumUpdate;

    impl_record_basics!();

    fn title(&self) -> &str {
        &self.name
    }

    fn count(&self) -> usize {
        self.count
    }

    fn updater() -> &'static Updater<Self, Self::Update> {
        &SHARED_ALBUM_UPDATER
    }
}

// ---------------------------------------------------------------------------
// Pinned

/// What a pinned tile shortcuts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinnedKind {
    Camera,
    Screenshot,
    Favorite,
    Video,
    Map,
    Album,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pinned {
    pub id: CollectionId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(rename = "type")]
    pub kind: PinnedKind,
    /// Referenced album when `kind` is [`PinnedKind::Album`].
    #[serde(rename = "albumID", default)]
    pub album_id: CollectionId,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub count: usize,
    /// Manual display position.
    #[serde(default)]
    pub index: u32,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
}

impl Pinned {
    pub fn new(title: impl Into<String>, kind: PinnedKind) -> Self {
        let now = Utc::now();
        Pinned {
            id: 0,
            title: title.into(),
            subtitle: String::new(),
            kind,
            album_id: 0,
            icon: String::new(),
            count: 0,
            index: 0,
            creation_date: now,
            modification_date: now,
        }
    }

    pub fn for_album(album_id: CollectionId) -> Self {
        let mut pinned = Pinned::new("", PinnedKind::Album);
        pinned.album_id = album_id;
        pinned
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PinnedUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub icon: Option<String>,
    pub index: Option<u32>,
}

static PINNED_UPDATER: LazyLock<Updater<Pinned, PinnedUpdate>> = LazyLock::new(|| {
    Updater::<Pinned, PinnedUpdate>::new()
        .scalar(|p, u| set_if_some(&mut p.title, &u.title))
        .scalar(|p, u| set_if_some(&mut p.subtitle, &u.subtitle))
        .scalar(|p, u| set_if_some(&mut p.icon, &u.icon))
        .scalar(|p, u| set_if_some(&mut p.index, &u.index))
        .post_update(|p| p.modification_date = Utc::now())
});

impl CollectionItem for Pinned {
    const KIND: &'static str = "pinned";
    type Update = PinnedUpdate;

    impl_record_basics!();

    fn title(&self) -> &str {
        &self.title
    }

    fn count(&self) -> usize {
        self.count
    }

    fn set_count(&mut self, count: usize) {
        self.count = count;
    }

    fn preview_query(&self) -> Option<SearchOptions> {
        let options = SearchOptions::new();
        match self.kind {
            PinnedKind::Camera => Some(SearchOptions { is_camera: Some(true), ..options }),
            PinnedKind::Screenshot => Some(options.screenshot(true)),
            PinnedKind::Favorite => Some(options.favorite(true)),
            PinnedKind::Video => Some(options.media_type(MediaType::Video)),
            PinnedKind::Album => Some(options.in_albums([self.album_id])),
            PinnedKind::Map | PinnedKind::Unknown => None,
        }
    }

    fn preview_limit(sizes: &PreviewSizes) -> usize {
        sizes.pinned
    }

    fn updater() -> &'static Updater<Self, Self::Update> {
        &PINNED_UPDATER
    }
}

// ---------------------------------------------------------------------------
// Village

/// Named geographic point shared by every user. Read-mostly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Village {
    pub id: CollectionId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
}

impl Village {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        let now = Utc::now();
        Village {
            id: 0,
            name: name.into(),
            latitude,
            longitude,
            creation_date: now,
            modification_date: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VillageUpdate {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

static VILLAGE_UPDATER: LazyLock<Updater<Village, VillageUpdate>> = LazyLock::new(|| {
    Updater::<Village, VillageUpdate>::new()
        .scalar(|v, u| set_if_some(&mut v.name, &u.name))
        .scalar(|v, u| set_if_some(&mut v.latitude, &u.latitude))
        .scalar(|v, u| set_if_some(&mut v.longitude, &u.longitude))
        .post_update(|v| v.modification_date = Utc::now())
});

impl CollectionItem for Village {
    const KIND: &'static str = "villages";
    type Update = VillageUpdate;

    impl_record_basics!();

    fn title(&self) -> &str {
        &self.name
    }

    fn updater() -> &'static Updater<Self, Self::Update> {
        &VILLAGE_UPDATER
    }
}
