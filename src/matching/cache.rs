//! Bounded, time-expiring cache of catalog rankings
//!
//! Each distinct query color maps to the full ranking of the catalog. The
//! cache holds at most `capacity` colors, evicting the least recently used
//! one when full, and treats entries older than the TTL as misses.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use lru::LruCache;

use super::rank::{filter_matches, rank_catalog, Match};
use crate::catalog::{Category, SwatchCatalog};
use crate::clock::{elapsed_between, Clock};
use crate::color::{Lab, Rgb};
use crate::config::CacheConfig;

/// Counters describing cache behavior since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped for capacity
    pub evictions: u64,
    /// Entries dropped for age
    pub expirations: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, zero before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct CachedRanking {
    ranked: Arc<Vec<Match>>,
    inserted_at: SystemTime,
}

#[derive(Debug)]
struct CacheState {
    entries: LruCache<Rgb, CachedRanking>,
    lab_memo: HashMap<Rgb, Lab>,
    stats: CacheStats,
    /// Bumped by every `clear`; a ranking computed under an older value is
    /// returned to its caller but never stored
    generation: u64,
}

/// Outcome of the locked half of a lookup
#[derive(Debug)]
enum Lookup {
    Hit(Arc<Vec<Match>>),
    Miss { lab: Lab, generation: u64 },
}

/// Match cache over a shared catalog
pub struct MatchCache {
    catalog: Arc<SwatchCatalog>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl MatchCache {
    pub fn new(catalog: Arc<SwatchCatalog>, config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            catalog,
            clock,
            ttl: config.ttl(),
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                lab_memo: HashMap::new(),
                stats: CacheStats {
                    capacity: capacity.get(),
                    ..CacheStats::default()
                },
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Best catalog matches for `query`, closest first
    ///
    /// The full ranking is cached per color; the category filter and the
    /// result limit are applied on the way out.
    pub fn find_matches(&self, query: Rgb, category: Option<Category>, max_results: usize) -> Vec<Match> {
        filter_matches(&self.ranked(query), category, max_results)
    }

    /// The closest match in `category`, if any usable swatch qualifies
    pub fn best_match(&self, query: Rgb, category: Option<Category>) -> Option<Match> {
        self.find_matches(query, category, 1).into_iter().next()
    }

    /// The complete cached ranking for `query`, computing it on a miss
    pub fn ranked(&self, query: Rgb) -> Arc<Vec<Match>> {
        let now = self.clock.now();
        let (lab, generation) = match self.begin(query, now) {
            Lookup::Hit(ranked) => return ranked,
            Lookup::Miss { lab, generation } => (lab, generation),
        };

        // Ranking runs unlocked so other colors are served meanwhile
        log::debug!("Match cache miss for {}", query);
        let ranked = Arc::new(rank_catalog(&self.catalog.current(), lab));
        self.store(query, &ranked, generation, now);
        ranked
    }

    fn begin(&self, query: Rgb, now: SystemTime) -> Lookup {
        let mut state = self.lock();
        if let Some(ranked) = self.lookup(&mut state, query, now) {
            state.stats.hits += 1;
            return Lookup::Hit(ranked);
        }
        state.stats.misses += 1;
        let lab = *state.lab_memo.entry(query).or_insert_with(|| query.to_lab());
        Lookup::Miss {
            lab,
            generation: state.generation,
        }
    }

    /// Insert a computed ranking unless the cache was cleared since the
    /// miss began; returns whether it was stored
    fn store(&self, query: Rgb, ranked: &Arc<Vec<Match>>, generation: u64, inserted_at: SystemTime) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            log::debug!("Discarding ranking for {} computed before a clear", query);
            return false;
        }
        let cached = CachedRanking {
            ranked: Arc::clone(ranked),
            inserted_at,
        };
        if let Some((evicted, _)) = state.entries.push(query, cached) {
            if evicted != query {
                log::debug!("Match cache evicted {}", evicted);
                state.lab_memo.remove(&evicted);
                state.stats.evictions += 1;
            }
        }
        state.stats.size = state.entries.len();
        true
    }

    /// A live entry for `query`, dropping it if it has expired
    fn lookup(&self, state: &mut CacheState, query: Rgb, now: SystemTime) -> Option<Arc<Vec<Match>>> {
        match state.entries.get(&query) {
            None => return None,
            Some(entry) if elapsed_between(entry.inserted_at, now) < self.ttl => {
                return Some(Arc::clone(&entry.ranked));
            }
            Some(_) => {}
        }
        state.entries.pop(&query);
        state.stats.expirations += 1;
        state.stats.size = state.entries.len();
        None
    }

    /// Whether a live entry exists, without touching recency
    pub fn contains(&self, query: Rgb) -> bool {
        let now = self.clock.now();
        self.lock()
            .entries
            .peek(&query)
            .is_some_and(|entry| elapsed_between(entry.inserted_at, now) < self.ttl)
    }

    /// Drop every cached ranking and the Lab memo together
    ///
    /// Call after every catalog reload so stale matches are never served.
    /// Rankings still being computed when this runs are not stored.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.entries.clear();
        state.lab_memo.clear();
        state.stats.size = 0;
        log::debug!("Match cache cleared");
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    pub fn catalog(&self) -> &Arc<SwatchCatalog> {
        &self.catalog
    }
}

impl std::fmt::Debug for MatchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCache")
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogMeta, Material, Resolution, StaticRegistry, SwatchEntry, SwatchSet};
    use crate::clock::ManualClock;
    use crate::config::CatalogConfig;
    use std::thread;

    fn swatch(id: &str, rgb: Rgb, category: Category) -> SwatchEntry {
        SwatchEntry::new(
            id,
            id,
            rgb,
            rgb.to_lab(),
            id,
            category,
            Resolution::Resolved(Material::new(id)),
        )
    }

    fn catalog() -> Arc<SwatchCatalog> {
        let catalog = SwatchCatalog::offline(
            CatalogConfig::default(),
            Arc::new(StaticRegistry::new()),
            Arc::new(ManualClock::at_millis(0)),
        );
        catalog.replace(SwatchSet::new(
            [
                swatch("red_wool", Rgb::new(160, 39, 34), Category::Building),
                swatch("blue_wool", Rgb::new(53, 57, 157), Category::Building),
                swatch("lime_wool", Rgb::new(112, 185, 25), Category::Building),
                swatch("poppy", Rgb::new(200, 20, 30), Category::Decoration),
            ],
            CatalogMeta::default(),
        ));
        Arc::new(catalog)
    }

    fn cache(capacity: usize, clock: Arc<ManualClock>) -> MatchCache {
        let config = CacheConfig {
            capacity,
            ttl_secs: 600,
        };
        MatchCache::new(catalog(), &config, clock)
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = cache(10, Arc::new(ManualClock::at_millis(0)));
        let red = Rgb::new(170, 30, 30);

        let first = cache.find_matches(red, None, 2);
        let second = cache.find_matches(red, None, 2);

        assert_eq!(first.len(), 2);
        assert_eq!(
            first.iter().map(|m| &m.swatch.catalog_id).collect::<Vec<_>>(),
            second.iter().map(|m| &m.swatch.catalog_id).collect::<Vec<_>>()
        );
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
        assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_full_ranking_is_cached_before_filtering() {
        let cache = cache(10, Arc::new(ManualClock::at_millis(0)));
        let red = Rgb::new(170, 30, 30);

        let decoration = cache.find_matches(red, Some(Category::Decoration), 5);
        assert_eq!(decoration.len(), 1);
        assert_eq!(decoration[0].swatch.catalog_id, "poppy");

        // Same color, different filter: served from the cached full ranking
        let all = cache.find_matches(red, None, 5);
        assert_eq!(all.len(), 4);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.ranked(red).len(), 4);
    }

    #[test]
    fn test_results_sorted_by_similarity() {
        let cache = cache(10, Arc::new(ManualClock::at_millis(0)));
        let matches = cache.find_matches(Rgb::new(60, 60, 150), None, 10);
        assert_eq!(matches[0].swatch.catalog_id, "blue_wool");
        for pair in matches.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        for m in &matches {
            assert!((m.similarity - (100.0 - m.delta_e).clamp(0.0, 100.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_least_recently_used_is_evicted_first() {
        let cache = cache(2, Arc::new(ManualClock::at_millis(0)));
        let (a, b, c) = (Rgb::new(1, 0, 0), Rgb::new(2, 0, 0), Rgb::new(3, 0, 0));

        cache.ranked(a);
        cache.ranked(b);
        cache.ranked(a); // a is now most recent
        cache.ranked(c); // evicts b

        assert!(cache.contains(a));
        assert!(!cache.contains(b));
        assert!(cache.contains(c));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let clock = Arc::new(ManualClock::at_millis(0));
        let cache = cache(10, Arc::clone(&clock));
        let red = Rgb::new(170, 30, 30);

        cache.ranked(red);
        clock.advance(Duration::from_secs(9 * 60));
        cache.ranked(red);
        assert_eq!(cache.stats().hits, 1);

        // Expiry counts from insertion, not from the last hit
        clock.advance(Duration::from_secs(61));
        assert!(!cache.contains(red));
        cache.ranked(red);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert!(cache.contains(red));
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = cache(10, Arc::new(ManualClock::at_millis(0)));
        cache.ranked(Rgb::new(1, 2, 3));
        cache.ranked(Rgb::new(4, 5, 6));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().size, 0);
        assert!(cache.lock().lab_memo.is_empty());

        cache.ranked(Rgb::new(1, 2, 3));
        assert_eq!(cache.stats().misses, 3);
    }

    #[test]
    fn test_clear_after_reload_serves_new_catalog() {
        let cache = cache(10, Arc::new(ManualClock::at_millis(0)));
        let query = Rgb::new(112, 185, 25);
        assert_eq!(cache.find_matches(query, None, 1)[0].swatch.catalog_id, "lime_wool");

        cache.catalog().replace(SwatchSet::new(
            [swatch("stone", Rgb::new(125, 125, 125), Category::Building)],
            CatalogMeta::default(),
        ));
        cache.clear();
        assert_eq!(cache.find_matches(query, None, 1)[0].swatch.catalog_id, "stone");
    }

    #[test]
    fn test_ranking_computed_across_clear_is_not_stored() {
        let clock = Arc::new(ManualClock::at_millis(0));
        let cache = cache(10, Arc::clone(&clock));
        let query = Rgb::new(112, 185, 25);

        // A miss begins against the old catalog
        let Lookup::Miss { lab, generation } = cache.begin(query, clock.now()) else {
            panic!("expected a miss on an empty cache");
        };
        let old_set = cache.catalog().current();

        // Reload lands while the ranking is still being computed
        cache.catalog().replace(SwatchSet::new(
            [swatch("stone", Rgb::new(125, 125, 125), Category::Building)],
            CatalogMeta::default(),
        ));
        cache.clear();

        let stale = Arc::new(rank_catalog(&old_set, lab));
        assert_eq!(stale[0].swatch.catalog_id, "lime_wool");
        assert!(!cache.store(query, &stale, generation, clock.now()));
        assert!(!cache.contains(query));

        let fresh = cache.find_matches(query, None, 1);
        assert_eq!(fresh[0].swatch.catalog_id, "stone");
    }

    #[test]
    fn test_clear_during_concurrent_miss_never_serves_old_catalog() {
        let clock = Arc::new(ManualClock::at_millis(0));
        let cache = Arc::new(cache(10, clock));
        let query = Rgb::new(160, 39, 34);

        let worker = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.find_matches(query, None, 1))
        };
        cache.catalog().replace(SwatchSet::new(
            [swatch("stone", Rgb::new(125, 125, 125), Category::Building)],
            CatalogMeta::default(),
        ));
        cache.clear();
        worker.join().unwrap();

        // Whatever the interleaving, the answer after the clear is the new catalog
        let after = cache.find_matches(query, None, 1);
        assert_eq!(after[0].swatch.catalog_id, "stone");
    }

    #[test]
    fn test_empty_catalog_yields_no_matches() {
        let catalog = Arc::new(SwatchCatalog::offline(
            CatalogConfig::default(),
            Arc::new(StaticRegistry::new()),
            Arc::new(ManualClock::at_millis(0)),
        ));
        let cache = MatchCache::new(catalog, &CacheConfig::default(), Arc::new(ManualClock::at_millis(0)));
        assert!(cache.find_matches(Rgb::WHITE, None, 5).is_empty());
        assert!(cache.best_match(Rgb::WHITE, None).is_none());
    }

    #[test]
    fn test_concurrent_queries() {
        let cache = Arc::new(cache(8, Arc::new(ManualClock::at_millis(0))));
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..16u8 {
                        let matches = cache.find_matches(Rgb::new(i * 30, j * 15, 40), None, 3);
                        assert_eq!(matches.len(), 3);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert!(stats.size <= 8);
        assert_eq!(stats.hits + stats.misses, 128);
    }
}
