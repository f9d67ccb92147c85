/// Repository layer for the locally persisted favorites slot
use crate::errors::{ApiError, ApiResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Name of the slot holding the favorites list
pub const FAVORITES_KEY: &str = "spacex-favorites";

/// Synchronous string key-value storage, the shape of browser local storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> ApiResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ApiResult<()>;
    fn remove(&self, key: &str) -> ApiResult<()>;
}

/// Keys kept as one JSON object in a file
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write of the file within the process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> ApiResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> ApiResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ApiError::Storage("store lock poisoned".to_string()))?;
        let mut map = self.read_map().unwrap_or_else(|e| {
            warn!("Discarding unreadable store {}: {}", self.path.display(), e);
            BTreeMap::new()
        });
        f(&mut map);
        self.write_map(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        self.modify(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> ApiResult<()> {
        self.modify(|map| {
            map.remove(key);
        })
    }
}

/// In-process store, used by tests and as a fallback
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> ApiResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ApiError::Storage("store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ApiResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Ordered favorites list with set membership, mirrored to its slot on every change
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<String>,
}

impl FavoritesStore {
    /// Read the slot once; anything but an array of strings is cleared
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let favorites = match store.get(FAVORITES_KEY) {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match parse_favorites(&raw) {
                Some(list) => list,
                None => {
                    warn!("Malformed favorites slot, resetting: {}", raw);
                    clear_slot(store.as_ref());
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Unreadable favorites slot, resetting: {}", e);
                clear_slot(store.as_ref());
                Vec::new()
            }
        };

        let mut unique: Vec<String> = Vec::with_capacity(favorites.len());
        for id in &favorites {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        let mut this = Self {
            store,
            favorites: unique,
        };
        if this.favorites.len() != favorites.len() {
            let deduped = this.favorites.clone();
            if let Err(e) = this.commit(deduped) {
                warn!("Could not rewrite favorites slot: {}", e);
            }
        }
        this
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    pub fn add(&mut self, id: &str) -> ApiResult<()> {
        if self.is_favorite(id) {
            return Ok(());
        }
        let mut next = self.favorites.clone();
        next.push(id.to_string());
        self.commit(next)
    }

    pub fn remove(&mut self, id: &str) -> ApiResult<()> {
        if !self.is_favorite(id) {
            return Ok(());
        }
        let next = self.favorites.iter().filter(|f| *f != id).cloned().collect();
        self.commit(next)
    }

    /// Returns whether `id` is a favorite afterwards
    pub fn toggle(&mut self, id: &str) -> ApiResult<bool> {
        if self.is_favorite(id) {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    /// Persist first, then adopt, so memory never runs ahead of the slot
    fn commit(&mut self, next: Vec<String>) -> ApiResult<()> {
        let encoded = serde_json::to_string(&next)?;
        self.store.set(FAVORITES_KEY, &encoded)?;
        debug!("Favorites persisted ({} ids)", next.len());
        self.favorites = next;
        Ok(())
    }
}

fn parse_favorites(raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Array(items) => items
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

fn clear_slot(store: &dyn KeyValueStore) {
    if let Err(e) = store.remove(FAVORITES_KEY) {
        warn!("Could not clear favorites slot: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    fn persisted(store: &MemoryStore) -> Option<Vec<String>> {
        store
            .get(FAVORITES_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_add_then_remove() {
        let store = memory();
        let mut favs = FavoritesStore::load(store.clone());
        favs.add("a").unwrap();
        assert!(favs.is_favorite("a"));
        assert_eq!(persisted(&store), Some(vec!["a".to_string()]));

        favs.remove("a").unwrap();
        assert!(!favs.is_favorite("a"));
        assert_eq!(persisted(&store), Some(vec![]));
    }

    #[test]
    fn test_toggle_twice_restores_set() {
        let store = memory();
        store.set(FAVORITES_KEY, r#"["x","y"]"#).unwrap();
        let mut favs = FavoritesStore::load(store.clone());
        let before = favs.favorites().to_vec();

        assert!(favs.toggle("z").unwrap());
        assert!(!favs.toggle("z").unwrap());
        assert_eq!(favs.favorites(), before.as_slice());

        assert!(!favs.toggle("x").unwrap());
        assert!(favs.toggle("x").unwrap());
        let mut after = favs.favorites().to_vec();
        after.sort();
        assert_eq!(after, before);
    }

    #[test]
    fn test_add_never_duplicates() {
        let mut favs = FavoritesStore::load(memory());
        favs.add("a").unwrap();
        favs.add("a").unwrap();
        assert_eq!(favs.len(), 1);
    }

    #[test]
    fn test_malformed_slot_is_cleared() {
        for raw in ["{not json", r#"{"a":1}"#, "42", "null", r#"["a", 3]"#] {
            let store = memory();
            store.set(FAVORITES_KEY, raw).unwrap();
            let favs = FavoritesStore::load(store.clone());
            assert!(favs.is_empty(), "{raw} should load as empty");
            assert_ne!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some(raw));
        }
    }

    #[test]
    fn test_duplicate_ids_collapse_on_load() {
        let store = memory();
        store.set(FAVORITES_KEY, r#"["a","b","a"]"#).unwrap();
        let favs = FavoritesStore::load(store.clone());
        assert_eq!(favs.favorites(), ["a".to_string(), "b".to_string()]);
        assert_eq!(
            persisted(&store),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_file_store_survives_reload() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("favorites.json");
        {
            let mut favs = FavoritesStore::load(Arc::new(FileStore::new(&path)));
            favs.add("5eb87cd9ffd86e000604b32a").unwrap();
            favs.add("5eb87cdaffd86e000604b32b").unwrap();
        }
        let favs = FavoritesStore::load(Arc::new(FileStore::new(&path)));
        assert_eq!(favs.len(), 2);
        assert!(favs.is_favorite("5eb87cdaffd86e000604b32b"));
    }

    #[test]
    fn test_file_store_corrupt_file_resets() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("favorites.json");
        fs::write(&path, "garbage").unwrap();
        let store = Arc::new(FileStore::new(&path));
        let mut favs = FavoritesStore::load(store.clone());
        assert!(favs.is_empty());
        favs.add("a").unwrap();
        assert_eq!(
            store.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["a"]"#)
        );
    }
}
