use std::sync::Arc;
use std::time::Duration;
use photodex::collection::model::{Album, AlbumUpdate, Pinned, PinnedKind, Trip, Village};
use photodex::core::config::Config;
use photodex::core::error::ErrorKind;
use photodex::core::types::{Asset, MediaType, UserId};
use photodex::imaging::{CachedImageLoader, FsImageLoader, ImageVariant};
use photodex::query::options::{SearchOptions, SortOrder};
use photodex::registry::LibraryRegistry;
use photodex::update::asset_update::AssetUpdate;
use photodex::library::UserLibrary;
use tempfile::TempDir;

const USER: UserId = UserId(11);

fn config(dir: &TempDir) -> Config {
    Config {
        maintenance_enabled: false,
        ..Config::for_path(dir.path())
    }
}

fn registry(dir: &TempDir) -> LibraryRegistry {
    LibraryRegistry::new(config(dir)).unwrap()
}

fn photo(name: &str) -> Asset {
    Asset::new(USER, name, MediaType::Image)
}

#[test]
fn album_membership_flows_into_search_and_preview() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    let asset = library.create_asset(photo("IMG_001.jpg")).unwrap();
    let album = library.create_collection(Album::new("Trip")).unwrap();
    library
        .update_assets(&AssetUpdate::for_assets([asset.id]).add_albums([album.id]))
        .unwrap();

    let hits = library.search(&SearchOptions::new().in_albums([album.id])).unwrap();
    assert_eq!(hits.ids(), vec![asset.id.0]);

    let album = library.get_collection::<Album>(album.id).unwrap();
    assert_eq!(album.count, 1);
    let preview = library.collection_preview::<Album>(album.id);
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0].id, asset.id);
}

#[test]
fn deleting_an_asset_lowers_counts_without_touching_metadata() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    let mut album = Album::new("Summer");
    album.subtitle = "2024".to_string();
    let album = library.create_collection(album).unwrap();
    let trip = library.create_collection(Trip::new("Coast")).unwrap();

    let keep = library.create_asset(photo("keep.jpg")).unwrap();
    let gone = library.create_asset(photo("gone.jpg")).unwrap();
    library
        .update_assets(
            &AssetUpdate::for_assets([keep.id, gone.id])
                .add_albums([album.id])
                .add_trips([trip.id]),
        )
        .unwrap();

    let before = library.get_collection::<Album>(album.id).unwrap();
    assert_eq!(before.count, 2);
    assert_eq!(library.get_collection::<Trip>(trip.id).unwrap().count, 2);

    library.delete_asset(gone.id).unwrap();
    let hits = library.search(&SearchOptions::new().in_albums([album.id])).unwrap();
    assert_eq!(hits.ids(), vec![keep.id.0]);

    let after = library.get_collection::<Album>(album.id).unwrap();
    assert_eq!(after.count, 1);
    assert_eq!(after.title, before.title);
    assert_eq!(after.subtitle, before.subtitle);
    assert_eq!(after.modification_date, before.modification_date);
    assert_eq!(library.get_collection::<Trip>(trip.id).unwrap().count, 1);
}

#[test]
fn deleting_a_collection_keeps_asset_references() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    let album = library.create_collection(Album::new("Old")).unwrap();
    let asset = library.create_asset(photo("a.jpg")).unwrap();
    library
        .update_asset(asset.id, &AssetUpdate::default().add_albums([album.id]))
        .unwrap();

    library.delete_collection::<Album>(album.id).unwrap();
    assert!(library.get_collection::<Album>(album.id).unwrap_err().is_not_found());
    assert_eq!(library.get_asset(asset.id).unwrap().albums, vec![album.id]);
    assert!(library.collection_preview::<Album>(album.id).is_empty());

    let err = library.delete_collection::<Album>(album.id).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn pinned_album_follows_album_title() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    let album = library.create_collection(Album::new("Draft")).unwrap();
    let pinned = library.create_collection(Pinned::for_album(album.id)).unwrap();
    let request = AlbumUpdate {
        title: Some("Final".to_string()),
        ..Default::default()
    };
    library.update_collection::<Album>(album.id, &request).unwrap();

    assert_eq!(library.get_collection::<Pinned>(pinned.id).unwrap().title, "Final");
}

#[test]
fn pinned_favorites_preview_newest_favorite() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    let pinned = library
        .create_collection(Pinned::new("Favorites", PinnedKind::Favorite))
        .unwrap();
    let map = library.create_collection(Pinned::new("Map", PinnedKind::Map)).unwrap();
    let a = library.create_asset(photo("a.jpg")).unwrap();
    let b = library.create_asset(photo("b.jpg")).unwrap();
    library.create_asset(photo("c.jpg")).unwrap();

    library.update_asset(a.id, &AssetUpdate::default().favorite(true)).unwrap();
    std::thread::sleep(Duration::from_millis(5));
    library.update_asset(b.id, &AssetUpdate::default().favorite(true)).unwrap();

    let favorites = library.get_collection::<Pinned>(pinned.id).unwrap();
    assert_eq!(favorites.count, 2);
    let preview = library.collection_preview::<Pinned>(pinned.id);
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0].id, b.id);

    assert!(library.collection_preview::<Pinned>(map.id).is_empty());
    assert_eq!(library.get_collection::<Pinned>(map.id).unwrap().count, 0);

    let late = library
        .create_collection(Pinned::new("Also favorites", PinnedKind::Favorite))
        .unwrap();
    assert_eq!(late.count, 2);
}

#[test]
fn camera_collections_group_by_make_and_model() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    for (make, model) in [("Sony", "A7 IV"), ("Apple", "iPhone 15"), ("Sony", "A7 IV"), ("Apple", "")] {
        let mut a = photo("x.jpg");
        a.camera_make = make.to_string();
        a.camera_model = model.to_string();
        library.create_asset(a).unwrap();
    }

    let cameras = library.cameras();
    let summary: Vec<(&str, &str, usize)> = cameras
        .iter()
        .map(|c| (c.camera_make.as_str(), c.camera_model.as_str(), c.count))
        .collect();
    assert_eq!(summary, vec![("Apple", "iPhone 15", 1), ("Sony", "A7 IV", 2)]);
    assert_eq!(cameras[1].preview.len(), 2);
}

#[test]
fn collections_sort_by_title_and_count() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    let b = library.create_collection(Album::new("Beta")).unwrap();
    let a = library.create_collection(Album::new("Alpha")).unwrap();
    let asset = library.create_asset(photo("x.jpg")).unwrap();
    library
        .update_asset(asset.id, &AssetUpdate::default().add_albums([b.id]))
        .unwrap();

    let titles = |albums: Vec<Album>| -> Vec<String> { albums.into_iter().map(|a| a.title).collect() };
    assert_eq!(titles(library.collections_sorted::<Album>("title", SortOrder::Asc)), vec!["Alpha", "Beta"]);
    assert_eq!(titles(library.collections_sorted::<Album>("count", SortOrder::Desc)), vec!["Beta", "Alpha"]);
    assert_eq!(titles(library.collections_sorted::<Album>("bogus", SortOrder::Desc)), vec!["Beta", "Alpha"]);
    assert_eq!(library.collections::<Album>().len(), 2);
    assert_eq!(a.id, 2);
}

#[test]
fn collections_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let registry = registry(&dir);
        let library = registry.get_or_open(USER).unwrap();
        let asset = library.create_asset(photo("x.jpg")).unwrap();
        let album = library.create_collection(Album::new("Keep")).unwrap();
        library
            .update_asset(asset.id, &AssetUpdate::default().add_albums([album.id]))
            .unwrap();
        registry.shutdown().unwrap();
    }

    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();
    let albums = library.collections::<Album>();
    assert_eq!(albums.len(), 1);
    // Counts and previews are recomputed on open.
    assert_eq!(albums[0].count, 1);
    assert_eq!(library.collection_preview::<Album>(albums[0].id).len(), 1);
}

#[test]
fn library_maintenance_stops_on_close() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let config = Config {
        maintenance_enabled: true,
        save_interval: Duration::from_millis(20),
        stats_interval: Duration::from_millis(20),
        cleanup_interval: Duration::ZERO,
        rebuild_interval: Duration::ZERO,
        ..Config::for_path(dir.path())
    };
    let library = UserLibrary::open(USER, &config, registry.villages().clone()).unwrap();
    assert!(library.is_maintained());

    library.create_asset(photo("a.jpg")).unwrap();
    let mut saved = false;
    for _ in 0..100 {
        if !library.index_status().dirty {
            saved = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(saved, "maintenance never persisted the index");

    library.close().unwrap();
    assert!(!library.is_maintained());
    library.close().unwrap();
}

#[test]
fn registry_shares_one_library_per_user() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);

    let first = registry.get_or_open(USER).unwrap();
    let second = registry.get_or_open(USER).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let opened: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| registry.get_or_open(UserId(42)).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(opened.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(registry.open_users(), vec![USER, UserId(42)]);
}

#[test]
fn registry_removes_and_rejects() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);

    let err = registry.get_or_open(UserId(0)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    registry.get_or_open(USER).unwrap();
    assert!(registry.remove_library(USER).unwrap());
    assert!(!registry.remove_library(USER).unwrap());
    assert!(registry.get(USER).is_none());

    registry.get_or_open(UserId(5)).unwrap();
    registry.shutdown().unwrap();
    assert!(registry.open_users().is_empty());
}

#[test]
fn villages_are_shared_across_users() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);

    let created = registry
        .villages()
        .write()
        .create(Village::new("Abyaneh", 33.5786, 51.6039))
        .unwrap();

    let alice = registry.get_or_open(UserId(1)).unwrap();
    let bob = registry.get_or_open(UserId(2)).unwrap();
    assert_eq!(alice.villages().len(), 1);
    assert_eq!(bob.village(created.id).unwrap().name, "Abyaneh");
    assert!(bob.village(99).unwrap_err().is_not_found());
}

#[test]
fn images_need_a_loader() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);

    let err = registry.load_image(USER, "a.jpg", ImageVariant::Original).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
}

#[test]
fn images_route_through_the_loader() {
    let dir = TempDir::new().unwrap();
    let loader = Arc::new(FsImageLoader::new(dir.path()));
    let cached = Arc::new(CachedImageLoader::new(loader, 8));
    let registry = registry(&dir).with_image_loader(cached.clone());

    let user_dir = dir.path().join("users").join(USER.to_string());
    std::fs::create_dir_all(user_dir.join("thumbnails")).unwrap();
    std::fs::create_dir_all(dir.path().join("icons")).unwrap();
    std::fs::write(user_dir.join("thumbnails").join("a.jpg"), b"tiny").unwrap();
    std::fs::write(dir.path().join("icons").join("star.png"), b"icon").unwrap();

    assert_eq!(registry.tiny_image(USER, "a.jpg").unwrap(), b"tiny".to_vec());
    assert_eq!(registry.icon("star.png").unwrap(), b"icon".to_vec());
    assert_eq!(cached.len(), 2);

    let missing = registry.original_image(USER, "a.jpg").unwrap_err();
    assert!(missing.is_not_found());
    let sneaky = registry.tiny_image(USER, "../secret").unwrap_err();
    assert_eq!(sneaky.kind, ErrorKind::InvalidArgument);
    let nobody = registry.tiny_image(UserId(0), "a.jpg").unwrap_err();
    assert_eq!(nobody.kind, ErrorKind::InvalidArgument);
}

#[test]
fn searches_run_alongside_updates() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let library = registry.get_or_open(USER).unwrap();

    let album_id = library.create_collection(Album::new("Busy")).unwrap().id;
    let ids: Vec<_> = (0..40)
        .map(|i| library.create_asset(photo(&format!("shot_{i}.jpg"))).unwrap().id)
        .collect();
    let total = ids.len();

    std::thread::scope(|s| {
        for chunk in ids.chunks(10) {
            let library = &library;
            s.spawn(move || {
                let request = AssetUpdate::default().favorite(true).add_albums([album_id]);
                for &id in chunk {
                    library.update_asset(id, &request).unwrap();
                }
            });
        }
        for _ in 0..4 {
            let library = &library;
            s.spawn(move || {
                let mut last_favorites = 0;
                let mut last_count = 0;
                for _ in 0..50 {
                    let favorites = library.search(&SearchOptions::new().favorite(true)).unwrap().total;
                    let count = library.get_collection::<Album>(album_id).unwrap().count;
                    // Updates only ever add, so neither view may go backwards.
                    assert!(favorites >= last_favorites);
                    assert!(count >= last_count);
                    assert!(favorites <= total && count <= total);
                    last_favorites = favorites;
                    last_count = count;
                }
            });
        }
    });

    let favorites = library.search(&SearchOptions::new().favorite(true)).unwrap();
    assert_eq!(favorites.total, total);
    assert_eq!(library.get_collection::<Album>(album_id).unwrap().count, total);
    assert_eq!(library.collection_preview::<Album>(album_id).len(), 6);
}

#[test]
fn users_open_and_write_in_parallel() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let users = [UserId(21), UserId(22), UserId(23)];

    let libraries: Vec<Arc<UserLibrary>> = std::thread::scope(|s| {
        let handles: Vec<_> = users
            .iter()
            .map(|&user| {
                let registry = &registry;
                s.spawn(move || {
                    let library = registry.get_or_open(user).unwrap();
                    for i in 0..5 {
                        library
                            .create_asset(Asset::new(user, format!("{user}_{i}.jpg"), MediaType::Image))
                            .unwrap();
                    }
                    library
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(registry.open_users(), users.to_vec());
    for (library, user) in libraries.iter().zip(users) {
        assert_eq!(library.user_id(), user);
        let assets = library.get_all_assets().unwrap();
        assert_eq!(assets.len(), 5);
        assert!(assets.iter().all(|a| a.user_id == user));
        assert!(Arc::ptr_eq(library, &registry.get(user).unwrap()));
    }
}
