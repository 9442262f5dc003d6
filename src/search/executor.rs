use std::sync::Arc;
use std::time::Instant;
use crate::core::types::Asset;
use crate::query::criteria::Criteria;
use crate::query::options::{SearchOptions, SortKey, SortOrder};
use crate::search::results::SearchResults;

/// Filter, sort and page `candidates` according to `options`.
///
/// `total` is the number of matches before paging.
pub fn execute<I>(options: &SearchOptions, candidates: I) -> SearchResults
where
    I: IntoIterator<Item = Arc<Asset>>,
{
    let start = Instant::now();
    let criteria = Criteria::build(options);

    let mut matched: Vec<Arc<Asset>> = candidates
        .into_iter()
        .filter(|asset| criteria.matches(asset))
        .collect();

    if let Some(key) = options.sort_by.as_deref().and_then(SortKey::parse) {
        sort_assets(&mut matched, key, options.sort_order);
    }

    let total = matched.len();
    let assets = paginate(matched, options.limit, options.offset);

    SearchResults {
        assets,
        total,
        took_ms: start.elapsed().as_millis() as u64,
    }
}

/// Stable, so equal keys keep their incoming order.
pub fn sort_assets(assets: &mut [Arc<Asset>], key: SortKey, order: SortOrder) {
    match order {
        SortOrder::Asc => assets.sort_by(|a, b| key.compare(a, b)),
        SortOrder::Desc => assets.sort_by(|a, b| key.compare(b, a)),
    }
}

/// `[offset, offset + limit)` clamped to the input; `limit == 0` keeps the tail.
pub fn paginate<T>(mut items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
    let start = offset.min(items.len());
    let end = if limit == 0 {
        items.len()
    } else {
        start.saturating_add(limit).min(items.len())
    };
    items.truncate(end);
    items.drain(..start);
    items
}
