//! In-memory store of normalized responses keyed by the resolved selection.

use hfed_core::{date_range::DateRange, observation::Dataset, province::Province};
use log::debug;
use std::{collections::HashMap, num::NonZeroUsize};

/// Exact identity of a fetched series. A full-series request and a dated
/// request for the same variable are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub province: Province,
    pub variable: String,
    pub range: Option<DateRange>,
}

impl CacheKey {
    pub fn new(province: Province, variable: &str, range: Option<DateRange>) -> Self {
        CacheKey {
            province,
            variable: variable.to_string(),
            range,
        }
    }
}

#[derive(Debug)]
struct Entry {
    data: Dataset,
    last_used: u64,
}

/// Keyed store of normalized datasets.
///
/// Unbounded unless built with a capacity, in which case the least recently
/// used entry is evicted to make room.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, Entry>,
    capacity: Option<NonZeroUsize>,
    clock: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        ResultCache::default()
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        ResultCache {
            capacity: Some(capacity),
            ..ResultCache::default()
        }
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up a dataset, marking it as recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<&Dataset> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = clock;
            &entry.data
        })
    }

    /// Store a dataset, replacing any previous value for the key.
    pub fn put(&mut self, key: CacheKey, data: Dataset) {
        self.clock += 1;
        if let Some(capacity) = self.capacity {
            if !self.entries.contains_key(&key) && self.entries.len() >= capacity.get() {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            key,
            Entry {
                data,
                last_used: self.clock,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            debug!(
                "Evicting cached {} {} ({:?})",
                key.province, key.variable, key.range
            );
            self.entries.remove(&key);
        }
    }
}
