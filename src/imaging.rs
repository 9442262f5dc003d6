use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use lru::LruCache;
use parking_lot::Mutex;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageVariant {
    Original,
    Tiny,
    Icon,
}

impl fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImageVariant::Original => f.write_str("original"),
            ImageVariant::Tiny => f.write_str("tiny"),
            ImageVariant::Icon => f.write_str("icon"),
        }
    }
}

/// Source of image bytes. Producing thumbnails is the loader's business; the
/// library only routes requests to it.
pub trait ImageLoader: Send + Sync {
    /// Icons are shared, `user` is ignored for [`ImageVariant::Icon`].
    fn load(&self, user: UserId, filename: &str, variant: ImageVariant) -> Result<Vec<u8>>;
}

/// Reads pre-rendered files from the storage tree:
/// `users/<id>/assets/<file>`, `users/<id>/thumbnails/<file>` and
/// `icons/<file>`.
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsImageLoader { root: root.into() }
    }

    fn path_for(&self, user: UserId, filename: &str, variant: ImageVariant) -> Result<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("invalid image name '{}'", filename),
            ));
        }
        let user_dir = self.root.join("users").join(user.to_string());
        Ok(match variant {
            ImageVariant::Original => user_dir.join("assets").join(filename),
            ImageVariant::Tiny => user_dir.join("thumbnails").join(filename),
            ImageVariant::Icon => self.root.join("icons").join(filename),
        })
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, user: UserId, filename: &str, variant: ImageVariant) -> Result<Vec<u8>> {
        let path = self.path_for(user, filename, variant)?;
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("{} image {}", variant, filename))
            } else {
                e.into()
            }
        })
    }
}

type ImageKey = (UserId, ImageVariant, String);

/// Keeps recently served small images in memory. Originals pass through.
pub struct CachedImageLoader {
    inner: Arc<dyn ImageLoader>,
    cache: Mutex<LruCache<ImageKey, Arc<Vec<u8>>>>,
}

impl CachedImageLoader {
    pub fn new(inner: Arc<dyn ImageLoader>, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        CachedImageLoader {
            inner,
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageLoader for CachedImageLoader {
    fn load(&self, user: UserId, filename: &str, variant: ImageVariant) -> Result<Vec<u8>> {
        if variant == ImageVariant::Original {
            return self.inner.load(user, filename, variant);
        }
        let owner = if variant == ImageVariant::Icon { UserId(0) } else { user };
        let key = (owner, variant, filename.to_string());

        if let Some(bytes) = self.cache.lock().get(&key) {
            return Ok(bytes.as_ref().clone());
        }
        let bytes = Arc::new(self.inner.load(user, filename, variant)?);
        self.cache.lock().put(key, bytes.clone());
        Ok(bytes.as_ref().clone())
    }
}
