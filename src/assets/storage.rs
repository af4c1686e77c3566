use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};

/// Arena of one asset kind.
///
/// Entities hold the `H` keys; the storage is the only owner of the assets.
/// Assets loaded from files are also indexed by a lookup key (normally the
/// path) so the same file is uploaded once.
pub struct AssetStorage<H: Key, T> {
    map: SlotMap<H, T>,
    lookup: FxHashMap<String, H>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: SlotMap::default(),
            lookup: FxHashMap::default(),
        }
    }

    /// Adds an asset and returns its handle.
    pub fn add(&mut self, asset: impl Into<T>) -> H {
        self.map.insert(asset.into())
    }

    /// Adds an asset under a lookup key. When the key is already known the
    /// existing handle is returned and `asset` is dropped.
    pub fn add_keyed(&mut self, key: &str, asset: impl Into<T>) -> H {
        if let Some(&handle) = self.lookup.get(key) {
            return handle;
        }
        let handle = self.map.insert(asset.into());
        self.lookup.insert(key.to_string(), handle);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: H) -> Option<&T> {
        self.map.get(handle)
    }

    #[must_use]
    pub fn handle_by_key(&self, key: &str) -> Option<H> {
        self.lookup.get(key).copied()
    }

    #[must_use]
    pub fn contains(&self, handle: H) -> bool {
        self.map.contains_key(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
