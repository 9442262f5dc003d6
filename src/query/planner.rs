use roaring::RoaringBitmap;
use crate::index::Indexer;
use crate::index::date::DayRange;
use crate::index::flag::FlagField;
use crate::index::index_set::IndexSet;
use crate::index::text::tokenize;
use crate::query::options::SearchOptions;

/// Where the executor draws candidates from before the full predicate runs.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidatePlan {
    /// No indexed clause is present.
    FullScan,
    /// Superset of the matching ids built from the indexed clauses.
    Ids(RoaringBitmap),
}

impl CandidatePlan {
    pub fn is_full_scan(&self) -> bool {
        matches!(self, CandidatePlan::FullScan)
    }
}

/// Intersects the postings of every indexed clause in `options`.
///
/// Indexes only narrow the candidate set; the composite predicate still
/// decides membership, so a clause missing here never changes results.
pub fn plan(options: &SearchOptions, indexes: &IndexSet) -> CandidatePlan {
    let mut acc: Option<RoaringBitmap> = None;

    let mut narrow = |ids: RoaringBitmap| {
        acc = Some(match acc.take() {
            Some(current) => current & ids,
            None => ids,
        });
    };

    if let Some(query) = options.query.as_deref() {
        let words = tokenize(query);
        if !words.is_empty() {
            narrow(indexes.text.search_words(&words));
        }
    }

    if let Some(media_type) = options.media_type {
        narrow(indexes.media_type.search(&media_type));
    }

    if options.has_camera() {
        narrow(indexes.camera.search_camera(
            options.camera_make.as_deref(),
            options.camera_model.as_deref(),
        ));
    }

    let flag_filters = [
        (FlagField::Favorite, options.is_favorite),
        (FlagField::Hidden, options.is_hidden),
        (FlagField::Screenshot, options.is_screenshot),
        (FlagField::Camera, options.is_camera),
    ];
    for (field, wanted) in flag_filters {
        if let (Some(value), Some(index)) = (wanted, indexes.flag(field)) {
            narrow(index.search(&value));
        }
    }
    if options.hide_screenshots {
        if let Some(index) = indexes.flag(FlagField::Screenshot) {
            narrow(index.search(&false));
        }
    }

    if options.has_date_range() {
        narrow(indexes.date.search(&DayRange::new(options.start_date, options.end_date)));
    }

    match acc {
        Some(ids) => CandidatePlan::Ids(ids),
        None => CandidatePlan::FullScan,
    }
}
