use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::Utc;
use crate::collection::model::CollectionItem;
use crate::core::config::PreviewSizes;
use crate::core::error::{Error, Result};
use crate::core::types::{Asset, CollectionId};
use crate::query::options::{SortKey, SortOrder};
use crate::storage::repository::{read_json_if_exists, write_json_atomic};
use crate::store::asset_store::AssetStore;

/// Orderings available on every collection kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionSortKey {
    Id,
    Title,
    Count,
    CreationDate,
    ModificationDate,
}

impl CollectionSortKey {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(CollectionSortKey::Id),
            "title" | "name" => Some(CollectionSortKey::Title),
            "count" => Some(CollectionSortKey::Count),
            "creationDate" => Some(CollectionSortKey::CreationDate),
            "modificationDate" => Some(CollectionSortKey::ModificationDate),
            _ => None,
        }
    }

    fn compare<T: CollectionItem>(&self, a: &T, b: &T) -> Ordering {
        match self {
            CollectionSortKey::Id => a.id().cmp(&b.id()),
            CollectionSortKey::Title => a.title().cmp(b.title()),
            CollectionSortKey::Count => a.count().cmp(&b.count()),
            CollectionSortKey::CreationDate => a.creation_date().cmp(&b.creation_date()),
            CollectionSortKey::ModificationDate => {
                a.modification_date().cmp(&b.modification_date())
            }
        }
    }
}

/// CRUD store for one collection kind, persisted as a single JSON array.
///
/// Previews are derived state and live only in memory; counts are written
/// back onto the records.
pub struct CollectionManager<T: CollectionItem> {
    path: PathBuf,
    items: BTreeMap<CollectionId, T>,
    previews: HashMap<CollectionId, Vec<Arc<Asset>>>,
    last_id: CollectionId,
}

impl<T: CollectionItem> CollectionManager<T> {
    /// Loads `<dir>/<kind>.json`, starting empty when it does not exist.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(format!("{}.json", T::KIND));
        let records: Vec<T> = read_json_if_exists(&path)?.unwrap_or_default();

        let items: BTreeMap<CollectionId, T> =
            records.into_iter().map(|item| (item.id(), item)).collect();
        let last_id = items.keys().next_back().copied().unwrap_or(0);

        log::debug!("Loaded {} {} from {}", items.len(), T::KIND, path.display());
        Ok(CollectionManager {
            path,
            items,
            previews: HashMap::new(),
            last_id,
        })
    }

    pub fn kind(&self) -> &'static str {
        T::KIND
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn save(&self) -> Result<()> {
        let records: Vec<&T> = self.items.values().collect();
        write_json_atomic(&self.path, &records)
    }

    fn missing(&self, id: CollectionId) -> Error {
        Error::not_found(format!("{} {}", T::KIND, id))
    }

    /// Assigns the next id and both timestamps.
    pub fn create(&mut self, mut item: T) -> Result<T> {
        let id = self.last_id + 1;
        item.set_id(id);
        item.set_dates(Utc::now());

        self.items.insert(id, item.clone());
        if let Err(e) = self.save() {
            self.items.remove(&id);
            return Err(e);
        }
        self.last_id = id;
        Ok(item)
    }

    pub fn get(&self, id: CollectionId) -> Result<T> {
        self.items.get(&id).cloned().ok_or_else(|| self.missing(id))
    }

    pub fn contains(&self, id: CollectionId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn update(&mut self, id: CollectionId, request: &T::Update) -> Result<T> {
        let Some(current) = self.items.get(&id) else {
            return Err(self.missing(id));
        };
        let mut item = current.clone();
        T::updater().apply(&mut item, request);
        item.set_id(id);

        let previous = self.items.insert(id, item.clone());
        if let Err(e) = self.save() {
            if let Some(previous) = previous {
                self.items.insert(id, previous);
            }
            return Err(e);
        }
        Ok(item)
    }

    /// Member assets keep their references to `id`; lookups tolerate them.
    pub fn delete(&mut self, id: CollectionId) -> Result<()> {
        let Some(removed) = self.items.remove(&id) else {
            return Err(self.missing(id));
        };
        if let Err(e) = self.save() {
            self.items.insert(id, removed);
            return Err(e);
        }
        self.previews.remove(&id);
        Ok(())
    }

    /// Every record in id order.
    pub fn get_all(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }

    /// Unknown keys keep id order.
    pub fn get_all_sorted(&self, sort_by: &str, order: SortOrder) -> Vec<T> {
        let mut items = self.get_all();
        if let Some(key) = CollectionSortKey::parse(sort_by) {
            match order {
                SortOrder::Asc => items.sort_by(|a, b| key.compare(a, b)),
                SortOrder::Desc => items.sort_by(|a, b| key.compare(b, a)),
            }
        }
        items
    }

    pub fn preview(&self, id: CollectionId) -> Vec<Arc<Asset>> {
        self.previews.get(&id).cloned().unwrap_or_default()
    }

    /// Edits records in place without touching their timestamps; persists
    /// when `f` reports a change for any of them.
    pub fn refresh_with<F>(&mut self, mut f: F) -> Result<usize>
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut changed = 0;
        for item in self.items.values_mut() {
            if f(item) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.save()?;
        }
        Ok(changed)
    }

    /// Re-derives every item's preview and count from `store`.
    pub fn recompute(&mut self, store: &AssetStore, sizes: &PreviewSizes) -> Result<()> {
        let limit = T::preview_limit(sizes);
        let mut counts_changed = false;

        for (id, item) in self.items.iter_mut() {
            let Some(query) = item.preview_query() else {
                self.previews.remove(id);
                continue;
            };
            let options = query
                .sort(SortKey::ModificationDate.as_str(), SortOrder::Desc)
                .page(limit, 0);
            let results = store.search(&options)?;

            if item.count() != results.total {
                item.set_count(results.total);
                counts_changed = true;
            }
            self.previews.insert(*id, results.assets);
        }

        if counts_changed {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::model::{Album, AlbumUpdate};
    use tempfile::TempDir;

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let mut albums = CollectionManager::<Album>::open(dir.path()).unwrap();
        let first = albums.create(Album::new("Trip")).unwrap();
        albums.create(Album::new("Family")).unwrap();
        albums.delete(first.id).unwrap();

        let reopened = CollectionManager::<Album>::open(dir.path()).unwrap();
        let titles: Vec<String> = reopened.get_all().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["Family".to_string()]);

        let mut reopened = reopened;
        let third = reopened.create(Album::new("Work")).unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let dir = TempDir::new().unwrap();
        let mut albums = CollectionManager::<Album>::open(dir.path()).unwrap();
        let mut album = Album::new("Trip");
        album.subtitle = "2024".to_string();
        let album = albums.create(album).unwrap();

        let request = AlbumUpdate {
            is_hidden: Some(true),
            ..Default::default()
        };
        let updated = albums.update(album.id, &request).unwrap();
        assert!(updated.is_hidden);
        assert_eq!(updated.title, "Trip");
        assert_eq!(updated.subtitle, "2024");
        assert!(updated.modification_date >= album.modification_date);

        assert!(albums.update(99, &request).unwrap_err().is_not_found());
    }
}
