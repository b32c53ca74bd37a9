use std::collections::BTreeMap;

use foundation::AssetId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheBudget {
    pub max_entries: usize,
}

impl CacheBudget {
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    /// Caching turned off: every request goes to the loader.
    pub fn disabled() -> Self {
        Self { max_entries: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    NoEvictableEntries,
    UnknownKey,
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::NoEvictableEntries => write!(f, "no evictable entries (all pinned?)"),
            CacheError::UnknownKey => write!(f, "unknown cache key"),
        }
    }
}

impl std::error::Error for CacheError {}

#[derive(Debug, Clone)]
struct CacheEntry<H> {
    handle: H,
    last_used_tick: u64,
    pin_count: u32,
}

/// Deterministic LRU cache of loaded asset handles.
///
/// Notes on determinism:
/// - Entries are keyed in a `BTreeMap` for stable traversal order.
/// - Eviction is LRU by `last_used_tick`, with a tie-break by key ordering.
/// - Pinned entries (the displayed asset) are never evicted.
#[derive(Debug)]
pub struct HandleCache<H> {
    budget: CacheBudget,
    tick: u64,
    entries: BTreeMap<AssetId, CacheEntry<H>>,
}

impl<H: Clone> HandleCache<H> {
    pub fn new(budget: CacheBudget) -> Self {
        Self {
            budget,
            tick: 0,
            entries: BTreeMap::new(),
        }
    }

    pub fn budget(&self) -> CacheBudget {
        self.budget
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.entries.contains_key(asset)
    }

    /// Cached handle for `asset`, marking it as most recently used.
    pub fn get(&mut self, asset: &AssetId) -> Option<H> {
        self.tick += 1;
        let entry = self.entries.get_mut(asset)?;
        entry.last_used_tick = self.tick;
        Some(entry.handle.clone())
    }

    /// Store (or refresh) a handle. Returns the keys evicted to stay in budget.
    pub fn insert(&mut self, asset: AssetId, handle: H) -> Result<Vec<AssetId>, CacheError> {
        if self.budget.max_entries == 0 {
            return Ok(Vec::new());
        }

        self.tick += 1;
        let tick = self.tick;
        let entry = self.entries.entry(asset.clone()).or_insert_with(|| CacheEntry {
            handle: handle.clone(),
            last_used_tick: tick,
            pin_count: 0,
        });
        entry.handle = handle;
        entry.last_used_tick = tick;

        self.evict_as_needed(Some(&asset))
    }

    pub fn pin(&mut self, asset: &AssetId) -> Result<(), CacheError> {
        let entry = self.entries.get_mut(asset).ok_or(CacheError::UnknownKey)?;
        entry.pin_count = entry.pin_count.saturating_add(1);
        Ok(())
    }

    pub fn unpin(&mut self, asset: &AssetId) -> Result<(), CacheError> {
        let entry = self.entries.get_mut(asset).ok_or(CacheError::UnknownKey)?;
        entry.pin_count = entry.pin_count.saturating_sub(1);
        Ok(())
    }

    pub fn is_pinned(&self, asset: &AssetId) -> bool {
        self.entries
            .get(asset)
            .map(|e| e.pin_count > 0)
            .unwrap_or(false)
    }

    pub fn evict(&mut self, asset: &AssetId) -> Result<(), CacheError> {
        self.entries
            .remove(asset)
            .map(|_| ())
            .ok_or(CacheError::UnknownKey)
    }

    fn evict_as_needed(&mut self, protected: Option<&AssetId>) -> Result<Vec<AssetId>, CacheError> {
        let mut evicted: Vec<AssetId> = Vec::new();
        while self.entries.len() > self.budget.max_entries {
            let pick = |exclude: Option<&AssetId>| {
                self.entries
                    .iter()
                    .filter(|(k, e)| e.pin_count == 0 && exclude.map(|p| p != *k).unwrap_or(true))
                    .min_by(|(ka, ea), (kb, eb)| {
                        ea.last_used_tick
                            .cmp(&eb.last_used_tick)
                            .then_with(|| ka.cmp(kb))
                    })
                    .map(|(k, _)| k.clone())
            };

            // Keep the entry that was just inserted unless nothing else can go.
            let candidate = pick(protected).or_else(|| pick(None));

            let Some(key) = candidate else {
                return Err(CacheError::NoEvictableEntries);
            };

            self.evict(&key)?;
            evicted.push(key);
        }
        Ok(evicted)
    }
}
