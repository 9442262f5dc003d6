use chrono::Utc;
use crate::core::types::Asset;
use crate::index::text::tokenize;
use crate::query::options::SearchOptions;
use crate::search::geo::{haversine_km, in_bounding_box};

type Clause = Box<dyn Fn(&Asset) -> bool + Send + Sync>;

/// Composite predicate compiled once from a [`SearchOptions`].
///
/// Clauses are AND-ed and evaluated in order, stopping at the first one that
/// rejects; membership lists are OR-ed inside their own clause.
pub struct Criteria {
    clauses: Vec<Clause>,
}

impl Criteria {
    pub fn build(options: &SearchOptions) -> Self {
        let mut clauses: Vec<Clause> = Vec::new();

        if let Some(user) = options.user_id {
            clauses.push(Box::new(move |a| a.user_id == user));
        }

        if let Some(query) = options.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let words = tokenize(query);
            if words.is_empty() {
                // Too short to be indexed, match as a raw fragment instead.
                let needle = query.to_lowercase();
                clauses.push(Box::new(move |a| a.filename.to_lowercase().contains(&needle)));
            } else {
                clauses.push(Box::new(move |a| {
                    let name_words = tokenize(&a.filename);
                    words.iter().all(|w| name_words.contains(w))
                }));
            }
        }

        if let Some(media_type) = options.media_type {
            clauses.push(Box::new(move |a| a.media_type == media_type));
        }
        if let Some(make) = options.camera_make.clone() {
            clauses.push(Box::new(move |a| a.camera_make == make));
        }
        if let Some(model) = options.camera_model.clone() {
            clauses.push(Box::new(move |a| a.camera_model == model));
        }

        if let Some(v) = options.is_favorite {
            clauses.push(Box::new(move |a| a.is_favorite == v));
        }
        if let Some(v) = options.is_hidden {
            clauses.push(Box::new(move |a| a.is_hidden == v));
        }
        if let Some(v) = options.is_screenshot {
            clauses.push(Box::new(move |a| a.is_screenshot == v));
        }
        if let Some(v) = options.is_camera {
            clauses.push(Box::new(move |a| a.is_camera == v));
        }
        if let Some(v) = options.is_landscape {
            clauses.push(Box::new(move |a| a.is_landscape() == v));
        }
        if options.hide_screenshots {
            clauses.push(Box::new(|a| !a.is_screenshot));
        }

        if let Some(width) = options.pixel_width {
            clauses.push(Box::new(move |a| a.pixel_width == width));
        }
        if let Some(height) = options.pixel_height {
            clauses.push(Box::new(move |a| a.pixel_height == height));
        }

        if options.has_date_range() {
            let start = options.start_date;
            let end = options.end_date.unwrap_or_else(|| Utc::now().date_naive());
            clauses.push(Box::new(move |a| {
                let day = a.captured_date.date_naive();
                start.is_none_or(|s| day >= s) && day <= end
            }));
        }

        if !options.albums.is_empty() {
            let wanted = options.albums.clone();
            clauses.push(Box::new(move |a| a.albums.iter().any(|id| wanted.contains(id))));
        }
        if !options.trips.is_empty() {
            let wanted = options.trips.clone();
            clauses.push(Box::new(move |a| a.trips.iter().any(|id| wanted.contains(id))));
        }
        if !options.persons.is_empty() {
            let wanted = options.persons.clone();
            clauses.push(Box::new(move |a| a.persons.iter().any(|id| wanted.contains(id))));
        }

        if let (Some([lat, lon]), Some(radius)) = (options.near_point, options.within_radius) {
            clauses.push(Box::new(move |a| match a.place.coordinates() {
                Some((alat, alon)) => haversine_km(lat, lon, alat, alon) <= radius,
                None => false,
            }));
        }
        if let Some(bbox) = options.bounding_box {
            clauses.push(Box::new(move |a| match a.place.coordinates() {
                Some((alat, alon)) => in_bounding_box(alat, alon, &bbox),
                None => false,
            }));
        }

        Criteria { clauses }
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        self.clauses.iter().all(|clause| clause(asset))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}
