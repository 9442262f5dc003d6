use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u32);

impl AssetId {
    pub fn new(id: u32) -> Self {
        AssetId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for AssetId {
    fn from(id: u32) -> Self {
        AssetId(id)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an album, trip, person, pinned tile, shared album or village.
pub type CollectionId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    #[serde(other)]
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Unknown => "unknown",
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "unknown" => Ok(MediaType::Unknown),
            other => Err(Error::new(
                ErrorKind::UnsupportedFormat,
                format!("unknown media type '{}'", other),
            )),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reverse-geocoded location of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub province: String,
    pub county: String,
    pub city: String,
    pub village: String,
}

impl Place {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Place {
            latitude,
            longitude,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.latitude == 0.0
            && self.longitude == 0.0
            && self.city.is_empty()
            && self.country.is_empty()
    }

    /// `(latitude, longitude)` when the asset carries a usable coordinate.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        if self.latitude == 0.0 && self.longitude == 0.0 {
            None
        } else {
            Some((self.latitude, self.longitude))
        }
    }
}

/// One photo or video owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(default)]
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub orientation: u16,
    #[serde(default)]
    pub pixel_width: u32,
    #[serde(default)]
    pub pixel_height: u32,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub place: Place,
    #[serde(default)]
    pub camera_make: String,
    #[serde(default)]
    pub camera_model: String,
    #[serde(default)]
    pub is_camera: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_screenshot: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub albums: Vec<CollectionId>,
    #[serde(default)]
    pub trips: Vec<CollectionId>,
    #[serde(default)]
    pub persons: Vec<CollectionId>,
    #[serde(default)]
    pub duration: f64,
    pub captured_date: DateTime<Utc>,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// A fresh record with every timestamp set to now. The id is assigned by
    /// the store on creation.
    pub fn new(user_id: UserId, filename: impl Into<String>, media_type: MediaType) -> Self {
        let now = Utc::now();
        Asset {
            id: AssetId(0),
            user_id,
            url: String::new(),
            filename: filename.into(),
            media_type,
            orientation: 0,
            pixel_width: 0,
            pixel_height: 0,
            file_size: 0,
            place: Place::default(),
            camera_make: String::new(),
            camera_model: String::new(),
            is_camera: false,
            is_favorite: false,
            is_screenshot: false,
            is_hidden: false,
            albums: Vec::new(),
            trips: Vec::new(),
            persons: Vec::new(),
            duration: 0.0,
            captured_date: now,
            creation_date: now,
            modification_date: now,
            deleted_at: None,
        }
    }

    /// Derived from the pixel dimensions; never stored or indexed.
    pub fn is_landscape(&self) -> bool {
        self.pixel_width > self.pixel_height
    }

    pub fn has_camera(&self) -> bool {
        !self.camera_model.is_empty()
    }
}
