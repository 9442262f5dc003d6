use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chrono::{Duration, TimeZone, Utc};
use photodex::core::config::Config;
use photodex::core::types::{Asset, AssetId, MediaType, UserId};
use photodex::index::index_set::IndexSet;
use photodex::query::options::{SearchOptions, SortOrder};
use photodex::storage::layout::StorageLayout;
use photodex::store::asset_store::AssetStore;
use rand::Rng;
use std::sync::Arc;
use tempfile::TempDir;

const USER: UserId = UserId(1);
const WORDS: [&str; 8] = ["beach", "sunset", "family", "rome", "party", "forest", "snow", "city"];

/// Helper to create a random asset
fn create_test_asset(i: usize) -> Asset {
    let mut rng = rand::thread_rng();
    let name = format!(
        "{}_{}_{}.jpg",
        WORDS[rng.gen_range(0..WORDS.len())],
        WORDS[rng.gen_range(0..WORDS.len())],
        i
    );
    let media_type = if rng.gen_bool(0.1) { MediaType::Video } else { MediaType::Image };
    let mut asset = Asset::new(USER, name, media_type);

    let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    asset.captured_date = base + Duration::hours(rng.gen_range(0..24 * 365 * 4));
    asset.is_favorite = rng.gen_bool(0.2);
    asset.is_screenshot = rng.gen_bool(0.05);
    asset.albums = vec![rng.gen_range(1..20)];
    if rng.gen_bool(0.5) {
        asset.camera_make = "Canon".to_string();
        asset.camera_model = format!("EOS R{}", rng.gen_range(1..6));
    }
    asset
}

fn populated_store(n: usize) -> (TempDir, AssetStore) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        maintenance_enabled: false,
        ..Config::for_path(dir.path())
    };
    let layout = Arc::new(StorageLayout::for_user(dir.path(), USER).unwrap());
    let mut store = AssetStore::open(USER, layout, config).unwrap();
    for i in 0..n {
        store.create(create_test_asset(i)).unwrap();
    }
    (dir, store)
}

/// Benchmark index rebuild from in-memory records
fn bench_index_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_rebuild");

    for size in [1_000, 10_000].iter() {
        let assets: Vec<Asset> = (0..*size)
            .map(|i| {
                let mut a = create_test_asset(i);
                a.id = AssetId(i as u32 + 1);
                a
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &assets, |b, assets| {
            b.iter(|| black_box(IndexSet::rebuild(assets.iter())));
        });
    }
    group.finish();
}

/// Benchmark typical queries against a populated store
fn bench_search(c: &mut Criterion) {
    let (_dir, store) = populated_store(5_000);
    let mut group = c.benchmark_group("search");

    let queries = [
        ("text", SearchOptions::new().query("beach sunset")),
        ("favorites", SearchOptions::new().favorite(true).page(50, 0)),
        ("album", SearchOptions::new().in_albums([3, 7]).sort("capturedDate", SortOrder::Desc)),
        ("camera", SearchOptions::new().camera(Some("Canon"), Some("EOS R3"))),
        ("full_scan_sorted", SearchOptions::new().sort("filename", SortOrder::Asc).page(100, 0)),
    ];

    for (name, options) in queries.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), options, |b, options| {
            b.iter(|| black_box(store.search(options).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_index_rebuild, bench_search);
criterion_main!(benches);
