use std::cmp::Ordering;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::core::types::{Asset, CollectionId, MediaType, UserId};

/// Every filter, sort and paging knob a search accepts. Unset fields do not
/// constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    #[serde(rename = "userID")]
    pub user_id: Option<UserId>,

    pub query: Option<String>,
    pub media_type: Option<MediaType>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,

    pub is_favorite: Option<bool>,
    pub is_hidden: Option<bool>,
    pub is_screenshot: Option<bool>,
    pub is_camera: Option<bool>,
    pub is_landscape: Option<bool>,
    pub hide_screenshots: bool,

    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    pub albums: Vec<CollectionId>,
    pub trips: Vec<CollectionId>,
    pub persons: Vec<CollectionId>,

    /// `[latitude, longitude]`
    pub near_point: Option<[f64; 2]>,
    /// Kilometres around `near_point`
    pub within_radius: Option<f64>,
    /// `[min_lat, min_lon, max_lat, max_lon]`
    pub bounding_box: Option<[f64; 4]>,

    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    /// 0 means no limit
    pub limit: usize,
    pub offset: usize,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn camera(mut self, make: Option<&str>, model: Option<&str>) -> Self {
        self.camera_make = make.map(str::to_string);
        self.camera_model = model.map(str::to_string);
        self
    }

    pub fn favorite(mut self, value: bool) -> Self {
        self.is_favorite = Some(value);
        self
    }

    pub fn hidden(mut self, value: bool) -> Self {
        self.is_hidden = Some(value);
        self
    }

    pub fn screenshot(mut self, value: bool) -> Self {
        self.is_screenshot = Some(value);
        self
    }

    pub fn landscape(mut self, value: bool) -> Self {
        self.is_landscape = Some(value);
        self
    }

    pub fn dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn in_albums(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.albums = ids.into_iter().collect();
        self
    }

    pub fn in_trips(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.trips = ids.into_iter().collect();
        self
    }

    pub fn in_persons(mut self, ids: impl IntoIterator<Item = CollectionId>) -> Self {
        self.persons = ids.into_iter().collect();
        self
    }

    pub fn near(mut self, latitude: f64, longitude: f64, radius_km: f64) -> Self {
        self.near_point = Some([latitude, longitude]);
        self.within_radius = Some(radius_km);
        self
    }

    pub fn within_box(mut self, bbox: [f64; 4]) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    pub fn sort(mut self, key: &str, order: SortOrder) -> Self {
        self.sort_by = Some(key.to_string());
        self.sort_order = order;
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn has_date_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn has_camera(&self) -> bool {
        self.camera_make.is_some() || self.camera_model.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Named comparators results can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    CapturedDate,
    CreationDate,
    ModificationDate,
    Filename,
}

impl SortKey {
    /// `None` for names with no registered comparator.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(SortKey::Id),
            "capturedDate" => Some(SortKey::CapturedDate),
            "creationDate" => Some(SortKey::CreationDate),
            "modificationDate" => Some(SortKey::ModificationDate),
            "filename" => Some(SortKey::Filename),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::CapturedDate => "capturedDate",
            SortKey::CreationDate => "creationDate",
            SortKey::ModificationDate => "modificationDate",
            SortKey::Filename => "filename",
        }
    }

    pub fn compare(&self, a: &Asset, b: &Asset) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::CapturedDate => a.captured_date.cmp(&b.captured_date),
            SortKey::CreationDate => a.creation_date.cmp(&b.creation_date),
            SortKey::ModificationDate => a.modification_date.cmp(&b.modification_date),
            SortKey::Filename => a.filename.cmp(&b.filename),
        }
    }
}
