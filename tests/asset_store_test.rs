use std::fs;
use std::sync::Arc;
use std::time::Duration;
use photodex::core::config::Config;
use photodex::core::error::ErrorKind;
use photodex::core::types::{Asset, AssetId, MediaType, UserId};
use photodex::query::options::{SearchOptions, SortOrder};
use photodex::storage::layout::StorageLayout;
use photodex::store::asset_store::AssetStore;
use photodex::store::maintenance::{MaintenanceHandle, MaintenanceSchedule};
use photodex::update::asset_update::AssetUpdate;
use parking_lot::RwLock;
use tempfile::TempDir;

const USER: UserId = UserId(7);

fn config(dir: &TempDir) -> Config {
    Config {
        maintenance_enabled: false,
        ..Config::for_path(dir.path())
    }
}

fn layout(dir: &TempDir) -> Arc<StorageLayout> {
    Arc::new(StorageLayout::for_user(dir.path(), USER).unwrap())
}

fn open(dir: &TempDir) -> AssetStore {
    AssetStore::open(USER, layout(dir), config(dir)).unwrap()
}

fn photo(name: &str) -> Asset {
    Asset::new(USER, name, MediaType::Image)
}

#[test]
fn create_assigns_monotonic_ids() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);

    let a = store.create(photo("a.jpg")).unwrap();
    let b = store.create(photo("b.jpg")).unwrap();
    assert_eq!(a.id, AssetId(1));
    assert_eq!(b.id, AssetId(2));

    store.delete(b.id).unwrap();
    let c = store.create(photo("c.jpg")).unwrap();
    assert_eq!(c.id, AssetId(3));
    assert_eq!(store.get(c.id).unwrap().filename, "c.jpg");
}

#[test]
fn create_rejects_oversized_uploads() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);

    let mut big = photo("huge.raw");
    big.file_size = store.config().max_upload_size + 1;
    let err = store.create(big).unwrap_err();
    assert_eq!(err.kind, ErrorKind::FileTooLarge);
    assert!(store.is_empty());
}

#[test]
fn delete_purges_every_structure() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    let a = store.create(photo("sunset_beach.jpg")).unwrap();

    store.delete(a.id).unwrap();

    assert!(store.get(a.id).unwrap_err().is_not_found());
    assert!(!store.indexes().contains(a.id));
    assert_eq!(store.search(&SearchOptions::new().query("sunset")).unwrap().total, 0);
    assert!(!layout(&dir).metadata_path(a.id).exists());

    let err = store.delete(a.id).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn batch_update_skips_unknown_ids() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    let a = store.create(photo("a.jpg")).unwrap();

    let request = AssetUpdate::for_assets([a.id, AssetId(99)]).favorite(true).add_albums([4]);
    let summary = store.update(&request).unwrap();

    assert_eq!(summary.updated, vec![a.id]);
    assert_eq!(summary.skipped, vec![AssetId(99)]);

    let updated = store.get(a.id).unwrap();
    assert!(updated.is_favorite);
    assert_eq!(updated.albums, vec![4]);
    assert!(updated.modification_date >= a.modification_date);

    let favorites = store.search(&SearchOptions::new().favorite(true)).unwrap();
    assert_eq!(favorites.ids(), vec![1]);
}

#[test]
fn batch_update_continues_past_a_vanished_record() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            store.create(photo(name)).unwrap();
        }
        store.close().unwrap();
    }

    // Reopen from the snapshot so nothing is cached, then pull a record file.
    let mut store = open(&dir);
    fs::remove_file(layout(&dir).metadata_path(AssetId(2))).unwrap();

    let request = AssetUpdate::for_assets([AssetId(1), AssetId(2), AssetId(3)]).favorite(true);
    let summary = store.update(&request).unwrap();

    assert_eq!(summary.updated, vec![AssetId(1), AssetId(3)]);
    assert_eq!(summary.skipped, vec![AssetId(2)]);
    assert!(store.get(AssetId(3)).unwrap().is_favorite);
    assert_eq!(store.search(&SearchOptions::new().favorite(true)).unwrap().ids(), vec![1, 3]);
}

#[test]
fn create_drops_repeated_membership_ids() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);

    let mut a = photo("a.jpg");
    a.albums = vec![3, 1, 3, 2, 1];
    a.trips = vec![9, 9];
    a.persons = vec![4, 5, 4];
    let created = store.create(a).unwrap();

    assert_eq!(created.albums, vec![3, 1, 2]);
    assert_eq!(created.trips, vec![9]);
    assert_eq!(created.persons, vec![4, 5]);

    store.close().unwrap();
    let reopened = open(&dir);
    assert_eq!(reopened.get(created.id).unwrap().albums, vec![3, 1, 2]);
    assert_eq!(reopened.search(&SearchOptions::new().in_albums([3])).unwrap().total, 1);
}

#[test]
fn add_is_deduplicated_and_replace_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    let a = store.create(photo("a.jpg")).unwrap();

    let add = AssetUpdate::for_assets([a.id]).add_albums([1, 2]);
    store.update(&add).unwrap();
    store.update(&add).unwrap();
    assert_eq!(store.get(a.id).unwrap().albums, vec![1, 2]);

    let replace = AssetUpdate::for_assets([a.id]).replace_albums([5, 6]);
    store.update(&replace).unwrap();
    let once = store.get(a.id).unwrap().albums.clone();
    store.update(&replace).unwrap();
    assert_eq!(store.get(a.id).unwrap().albums, once);
    assert_eq!(once, vec![5, 6]);
}

#[test]
fn updates_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        let a = store.create(photo("a.jpg")).unwrap();
        store.update(&AssetUpdate::for_assets([a.id]).hidden(true)).unwrap();
        store.close().unwrap();
    }

    let store = open(&dir);
    let a = store.get(AssetId(1)).unwrap();
    assert!(a.is_hidden);
    assert_eq!(store.search(&SearchOptions::new().hidden(true)).unwrap().total, 1);
}

#[test]
fn snapshot_is_used_on_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        store.create(photo("rome_trip.jpg")).unwrap();
        store.create(photo("paris_trip.jpg")).unwrap();
        assert!(store.is_dirty());
        assert!(store.persist_if_dirty().unwrap());
        assert!(!store.persist_if_dirty().unwrap());
    }

    let mut store = open(&dir);
    let status = store.index_status();
    assert!(status.last_rebuild.is_none());
    assert!(status.last_save.is_some());
    assert!(!status.dirty);
    assert_eq!(status.asset_count, 2);
    assert_eq!(store.search(&SearchOptions::new().query("trip")).unwrap().total, 2);

    let next = store.create(photo("berlin.jpg")).unwrap();
    assert_eq!(next.id, AssetId(3));
}

#[test]
fn corrupt_snapshot_triggers_rebuild() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        store.create(photo("rome_trip.jpg")).unwrap();
        store.save_index().unwrap();
    }

    let path = layout(&dir).index_snapshot_path();
    let mut bytes = fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xA5;
    fs::write(&path, bytes).unwrap();

    let store = open(&dir);
    assert!(store.index_status().last_rebuild.is_some());
    assert_eq!(store.search(&SearchOptions::new().query("rome")).unwrap().ids(), vec![1]);
}

#[test]
fn stale_snapshot_triggers_rebuild() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        store.create(photo("a.jpg")).unwrap();
        store.save_index().unwrap();
        // Written to disk but never snapshotted.
        store.create(photo("b.jpg")).unwrap();
    }

    let store = open(&dir);
    assert!(store.index_status().last_rebuild.is_some());
    assert_eq!(store.len(), 2);
}

#[test]
fn orphan_cleanup_removes_records_without_files() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    let kept = store.create(photo("kept.jpg")).unwrap();
    let lost = store.create(photo("lost.jpg")).unwrap();
    fs::write(layout(&dir).asset_path("kept.jpg"), b"jpeg").unwrap();

    assert_eq!(store.cleanup_orphans().unwrap(), 1);
    assert!(store.get(kept.id).is_ok());
    assert!(store.get(lost.id).unwrap_err().is_not_found());

    let stats = store.stats();
    assert_eq!(stats.total_assets, 1);
    assert_eq!(stats.orphans_removed, 1);
    assert_eq!(stats.uploads_24h, 2);
}

#[test]
fn get_all_sorted_by_filename() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    for name in ["b.jpg", "c.jpg", "a.jpg"] {
        store.create(photo(name)).unwrap();
    }

    let names = |assets: Vec<Arc<Asset>>| -> Vec<String> {
        assets.iter().map(|a| a.filename.clone()).collect()
    };
    assert_eq!(names(store.get_all().unwrap()), vec!["b.jpg", "c.jpg", "a.jpg"]);
    assert_eq!(
        names(store.get_all_sorted("filename", SortOrder::Asc).unwrap()),
        vec!["a.jpg", "b.jpg", "c.jpg"]
    );
    assert_eq!(
        names(store.get_all_sorted("nonsense", SortOrder::Asc).unwrap()),
        vec!["b.jpg", "c.jpg", "a.jpg"]
    );
}

#[test]
fn maintenance_saves_dirty_index_and_stops_cleanly() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(RwLock::new(open(&dir)));
    store.write().create(photo("a.jpg")).unwrap();

    let schedule = MaintenanceSchedule {
        save: Duration::from_millis(20),
        rebuild: Duration::ZERO,
        stats: Duration::ZERO,
        cleanup: Duration::ZERO,
    };
    let handle = MaintenanceHandle::start(store.clone(), schedule);
    assert!(handle.is_running());

    let mut saved = false;
    for _ in 0..100 {
        if !store.read().is_dirty() {
            saved = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(saved, "maintenance loop never saved the index");

    store.write().create(photo("b.jpg")).unwrap();
    handle.stop().unwrap();
    assert!(!handle.is_running());
    // stop() flushes whatever the loop had not saved yet.
    assert!(!store.read().is_dirty());
    handle.stop().unwrap();
}
