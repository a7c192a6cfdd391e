//! Process-wide per-class metadata cache.
//!
//! Entries are computed on first use and kept for the life of the process.
//! Two threads missing on the same class may both compute the entry; the
//! first insert wins and both callers get the stored value.

use dashmap::DashMap;
use mimic_core::{Class, ClassId};
use parking_lot::RwLock;
use tracing::debug;

/// Hit/miss counters of a metadata cache
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that computed the entry
    pub misses: u64,
    /// Entries currently stored
    pub entries: usize,
}

/// Concurrent map from class to derived metadata
pub struct MetadataCache<V> {
    name: &'static str,
    entries: DashMap<ClassId, V>,
    stats: RwLock<CacheStats>,
}

impl<V: Clone> MetadataCache<V> {
    /// Empty cache; `name` labels log events
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Cached entry for `class`, computing it with `build` on a miss.
    ///
    /// A failed build stores nothing.
    pub fn get_or_try_build<E, F>(&self, class: &Class, build: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.entries.get(&class.id()) {
            self.stats.write().hits += 1;
            return Ok(hit.value().clone());
        }

        let built = build()?;
        self.stats.write().misses += 1;
        debug!(cache = self.name, class = class.name(), "metadata cache miss");
        Ok(self.entries.entry(class.id()).or_insert(built).value().clone())
    }

    /// Infallible variant of [`MetadataCache::get_or_try_build`]
    pub fn get_or_build(&self, class: &Class, build: impl FnOnce() -> V) -> V {
        match self.get_or_try_build(class, || Ok::<V, std::convert::Infallible>(build())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Number of cached classes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..*self.stats.read()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::ClassBuilder;

    #[test]
    fn test_miss_then_hit() {
        let cache: MetadataCache<usize> = MetadataCache::new("test");
        let class = ClassBuilder::new("A").build();
        let mut builds = 0;
        for _ in 0..3 {
            let value = cache.get_or_build(&class, || {
                builds += 1;
                7
            });
            assert_eq!(value, 7);
        }
        assert_eq!(builds, 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache: MetadataCache<usize> = MetadataCache::new("test");
        let class = ClassBuilder::new("B").build();
        assert_eq!(cache.get_or_try_build(&class, || Err("nope")), Err("nope"));
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_try_build(&class, || Ok::<_, &str>(1)), Ok(1));
        assert_eq!(cache.len(), 1);
    }
}
