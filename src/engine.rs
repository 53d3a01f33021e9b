//! Query surface tying the catalog, match cache and interpolator together
//!
//! A [`GradientEngine`] is an ordinary owned value: several engines over
//! independent catalogs can coexist, and tests build their own.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::catalog::{Category, Material, MaterialRegistry, SwatchCatalog};
use crate::clock::{Clock, SystemClock};
use crate::color::{hex_to_rgb, Rgb};
use crate::config::EngineConfig;
use crate::error::ColorError;
use crate::gradient::{is_valid_configuration, Cell, GradientGrid, GradientInterpolator, Seed};
use crate::matching::{CacheStats, Match, MatchCache};

/// Supplies the materials a given requester may use
///
/// The requester is opaque to the engine; how each set is computed is up to
/// the implementation.
pub trait AllowListProvider: Send + Sync {
    fn allow_list(&self, requester: &str) -> HashSet<Material>;
}

/// Fixed allow-lists with a fallback for unknown requesters
#[derive(Debug, Clone, Default)]
pub struct StaticAllowList {
    fallback: HashSet<Material>,
    per_requester: HashMap<String, HashSet<Material>>,
}

impl StaticAllowList {
    pub fn new<I, M>(fallback: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Material>,
    {
        Self {
            fallback: fallback.into_iter().map(Into::into).collect(),
            per_requester: HashMap::new(),
        }
    }

    pub fn with_requester<I, M>(mut self, requester: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Material>,
    {
        self.per_requester
            .insert(requester.into(), allowed.into_iter().map(Into::into).collect());
        self
    }
}

impl AllowListProvider for StaticAllowList {
    fn allow_list(&self, requester: &str) -> HashSet<Material> {
        self.per_requester
            .get(requester)
            .unwrap_or(&self.fallback)
            .clone()
    }
}

/// Color matching and gradient synthesis over one catalog
pub struct GradientEngine {
    config: EngineConfig,
    catalog: Arc<SwatchCatalog>,
    cache: MatchCache,
    interpolator: GradientInterpolator,
    allow_lists: Box<dyn AllowListProvider>,
}

impl GradientEngine {
    /// Assemble an engine around an existing catalog
    ///
    /// The catalog is not loaded here; call
    /// [`reload_catalog`](Self::reload_catalog) once at startup.
    pub fn new(
        config: EngineConfig,
        catalog: Arc<SwatchCatalog>,
        allow_lists: Box<dyn AllowListProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = MatchCache::new(Arc::clone(&catalog), &config.cache, clock);
        let interpolator = GradientInterpolator::new(&config.gradient);
        Self {
            config,
            catalog,
            cache,
            interpolator,
            allow_lists,
        }
    }

    /// Engine fetching its catalog over HTTP, on the system clock
    pub fn with_http(
        config: EngineConfig,
        registry: Arc<dyn MaterialRegistry>,
        allow_lists: Box<dyn AllowListProvider>,
    ) -> Self {
        let catalog = Arc::new(SwatchCatalog::with_http(config.catalog.clone(), registry));
        Self::new(config, catalog, allow_lists, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<SwatchCatalog> {
        &self.catalog
    }

    /// Closest usable swatches to `query`, most similar first
    pub fn find_matches(&self, query: Rgb, category: Option<Category>, max_results: usize) -> Vec<Match> {
        self.cache.find_matches(query, category, max_results)
    }

    /// [`find_matches`](Self::find_matches) for a `#RRGGBB` string
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidHex`] if `hex` is not a color.
    pub fn find_matches_hex(
        &self,
        hex: &str,
        category: Option<Category>,
        max_results: usize,
    ) -> Result<Vec<Match>, ColorError> {
        Ok(self.find_matches(hex_to_rgb(hex)?, category, max_results))
    }

    /// Interpolate `seeds` across the grid using only `allow_list`
    pub fn calculate_gradient(
        &self,
        seeds: &BTreeMap<Cell, Seed>,
        rows: usize,
        cols: usize,
        allow_list: &HashSet<Material>,
    ) -> GradientGrid {
        let set = self.catalog.current();
        self.interpolator.calculate_gradient(seeds, rows, cols, &set, allow_list)
    }

    /// Interpolate using the allow-list the provider gives `requester`
    pub fn calculate_gradient_for(
        &self,
        requester: &str,
        seeds: &BTreeMap<Cell, Seed>,
        rows: usize,
        cols: usize,
    ) -> GradientGrid {
        let allow_list = self.allow_lists.allow_list(requester);
        self.calculate_gradient(seeds, rows, cols, &allow_list)
    }

    /// Interpolate against the whole catalog
    ///
    /// Blended colors are resolved through the match cache, so cells use
    /// the perceptually closest material rather than the RGB-closest one.
    pub fn calculate_gradient_unrestricted(
        &self,
        seeds: &BTreeMap<Cell, Seed>,
        rows: usize,
        cols: usize,
    ) -> GradientGrid {
        self.interpolator.fill(seeds, rows, cols, |color| {
            self.cache
                .best_match(color, None)
                .and_then(|best| best.swatch.material().map(Material::to_string))
        })
    }

    /// See [`is_valid_configuration`](crate::gradient::is_valid_configuration)
    pub fn is_valid_configuration(
        &self,
        seeds: &BTreeMap<Cell, Seed>,
        min_seeds: usize,
        ignore_transparent: bool,
        ignore_same_color: bool,
    ) -> bool {
        is_valid_configuration(seeds, min_seeds, ignore_transparent, ignore_same_color)
    }

    /// Validity against the configured minimum seed count
    pub fn has_enough_seeds(&self, seeds: &BTreeMap<Cell, Seed>) -> bool {
        is_valid_configuration(seeds, self.config.gradient.min_seeds, true, true)
    }

    /// Load the catalog and drop every cached match
    ///
    /// Blocks for as long as the fetch and its retries take. Returns
    /// `false` when no data source was available.
    pub fn reload_catalog(&self) -> bool {
        let loaded = self.catalog.load();
        self.cache.clear();
        loaded
    }

    pub fn clear_caches(&self) {
        self.cache.clear();
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    /// Epoch milliseconds of the fetch behind the current catalog
    pub fn last_update(&self) -> u64 {
        self.catalog.last_update()
    }

    pub fn catalog_version(&self) -> String {
        self.catalog.version()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for GradientEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradientEngine")
            .field("catalog", &self.catalog)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
