pub mod core;
pub mod storage;
pub mod index;
pub mod update;
pub mod query;
pub mod search;
pub mod store;
pub mod collection;
pub mod library;
pub mod registry;
pub mod imaging;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{Asset, AssetId, CollectionId, MediaType, Place, UserId};
pub use crate::library::UserLibrary;
pub use crate::query::options::{SearchOptions, SortOrder};
pub use crate::registry::LibraryRegistry;
pub use crate::update::asset_update::AssetUpdate;

/*
┌──────────────────────────────────────────────────────────────────────────────────────┐
│                              PHOTODEX STRUCT ARCHITECTURE                            │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── REGISTRY LAYER ──────────────────────────────────┐
│                                                                                      │
│  struct LibraryRegistry                                                              │
│  • config: Config                                                                    │
│  • libraries: RwLock<HashMap<UserId, Arc<UserLibrary>>>   // lazily opened          │
│  • villages: Arc<RwLock<CollectionManager<Village>>>      // shared by all users    │
│  • images: Option<Arc<dyn ImageLoader>>                   // original/tiny/icon     │
│                                                                                      │
│  struct UserLibrary                                                                  │
│  • state: Arc<RwLock<LibraryState>>                       // one lock per user      │
│  • maintenance: Option<MaintenanceHandle>                 // select! over tickers   │
│                                                                                      │
│  struct LibraryState                                                                 │
│  • assets: AssetStore                                                                │
│  • albums / trips / persons / shared_albums / pinned: CollectionManager<T>          │
│  • cameras: Vec<CameraCollection>                         // derived, not stored    │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── STORE LAYER ────────────────────────────────────┐
│                                                                                      │
│  struct AssetStore                                                                   │
│  • repository: Arc<dyn AssetRepository>      // metadata/<id>.json                  │
│  • snapshots: Arc<dyn SnapshotStore>         // meta/index.bin (crc32 + lz4)        │
│  • cache: AssetCache                         // Mutex<LruCache<AssetId, Arc<Asset>>>│
│  • catalog: BTreeMap<AssetId, String>        // live ids -> filename                │
│  • indexes: IndexSet                                                                 │
│      text: TextIndexer          word -> RoaringBitmap                                │
│      date: DateIndexer          day  -> RoaringBitmap                                │
│      media_type / camera        ExactIndexer<K>                                      │
│      flags: Vec<BoolIndexer>    favorite / hidden / screenshot / camera              │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── QUERY FLOW ──────────────────────────────────────┐
│                                                                                      │
│  SearchOptions ──plan──> CandidatePlan (Ids | FullScan) ──fetch──> Arc<Asset>        │
│        │                                                       │                     │
│        └──build──> Criteria (AND of clauses) ──filter──────────┘                     │
│                           │                                                          │
│                           └──> sort_assets(SortKey, SortOrder) ──> paginate          │
│                                                                                      │
│  AssetUpdate ──Updater::apply──> scalar setters ──> collection ops ──> hooks         │
│                                                                                      │
└──────────────────────────────────────────────────────────────────────────────────────┘
*/
