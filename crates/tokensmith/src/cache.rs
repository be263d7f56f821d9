//! Memoization for repeated resolution runs.
//!
//! Two kinds of work repeat across runs over the same stylesheet: parsing
//! declaration names into namespace and key, and building reference
//! indexes. Both are held in bounded LRU caches owned by the
//! [`Engine`](crate::Engine); nothing is process global.
//!
//! An index is keyed by scope plus the length of every layer and a
//! fingerprint of the layers' contents, so an edited value with unchanged
//! counts still misses.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use log::trace;
use lru::LruCache;

use crate::declaration::Declaration;
use crate::namespace::{
    parse_namespace_key, parse_nested_path, NestingPolicy, ParsedKey, ParsedName,
};
use crate::resolve::ReferenceIndex;

/// Default capacity of the reference-index cache.
pub const DEFAULT_INDEX_CAPACITY: usize = 64;

/// Default capacity of each key-parse cache.
pub const DEFAULT_KEY_CAPACITY: usize = 4096;

fn capacity(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN)
}

/// Identity of a reference index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    /// Variant id, `None` for the base scope.
    pub scope: Option<String>,
    pub lengths: Vec<usize>,
    pub fingerprint: u64,
}

impl IndexKey {
    /// Computes the key for an index layered from `layers`.
    pub fn for_layers<'a, L, I>(scope: Option<&str>, layers: L) -> Self
    where
        L: IntoIterator<Item = I>,
        I: IntoIterator<Item = &'a Declaration>,
    {
        use std::hash::Hasher;

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        let mut lengths = Vec::new();
        for layer in layers {
            let mut count = 0;
            for declaration in layer {
                declaration.name.hash(&mut hasher);
                declaration.value.hash(&mut hasher);
                count += 1;
            }
            lengths.push(count);
        }
        Self {
            scope: scope.map(str::to_string),
            lengths,
            fingerprint: hasher.finish(),
        }
    }
}

/// Memoized name and key parsing.
pub struct KeyCache {
    names: LruCache<String, Option<ParsedName>>,
    paths: LruCache<(String, NestingPolicy), ParsedKey>,
}

impl KeyCache {
    pub fn new(capacity_per_table: usize) -> Self {
        Self {
            names: LruCache::new(capacity(capacity_per_table)),
            paths: LruCache::new(capacity(capacity_per_table)),
        }
    }

    /// [`parse_namespace_key`], memoized by name.
    pub fn parse_name(&mut self, name: &str) -> Option<ParsedName> {
        if let Some(parsed) = self.names.get(name) {
            return parsed.clone();
        }
        let parsed = parse_namespace_key(name);
        self.names.put(name.to_string(), parsed.clone());
        parsed
    }

    /// [`parse_nested_path`], memoized by key and policy.
    pub fn parse_path(&mut self, key: &str, policy: &NestingPolicy) -> ParsedKey {
        let cache_key = (key.to_string(), *policy);
        if let Some(parsed) = self.paths.get(&cache_key) {
            return parsed.clone();
        }
        let parsed = parse_nested_path(key, policy);
        self.paths.put(cache_key, parsed.clone());
        parsed
    }

    pub fn len(&self) -> usize {
        self.names.len() + self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.paths.clear();
    }
}

impl Default for KeyCache {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_CAPACITY)
    }
}

/// Hit and miss counters for the index cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Every cache an engine carries.
pub struct ResolutionCache {
    indexes: LruCache<IndexKey, Arc<ReferenceIndex>>,
    keys: KeyCache,
    hits: u64,
    misses: u64,
}

impl ResolutionCache {
    pub fn new(index_capacity: usize, key_capacity: usize) -> Self {
        Self {
            indexes: LruCache::new(capacity(index_capacity)),
            keys: KeyCache::new(key_capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached index for `key`, building it on a miss.
    pub fn index_for(
        &mut self,
        key: IndexKey,
        build: impl FnOnce() -> ReferenceIndex,
    ) -> Arc<ReferenceIndex> {
        if let Some(index) = self.indexes.get(&key) {
            self.hits += 1;
            trace!("reference index hit for scope {:?}", key.scope);
            return Arc::clone(index);
        }
        self.misses += 1;
        trace!("reference index miss for scope {:?}", key.scope);
        let index = Arc::new(build());
        self.indexes.put(key, Arc::clone(&index));
        index
    }

    pub fn keys(&mut self) -> &mut KeyCache {
        &mut self.keys
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.indexes.len(),
        }
    }

    /// Drops every cached entry and resets the counters.
    pub fn clear(&mut self) {
        self.indexes.clear();
        self.keys.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_CAPACITY, DEFAULT_KEY_CAPACITY)
    }
}
