//! Perceptual ranking of the catalog against a query color

use std::sync::Arc;

use rayon::prelude::*;

use crate::catalog::{Category, SwatchEntry, SwatchSet};
use crate::color::{delta_e_2000, DeltaECategory, Lab};
use crate::constants::cache::MAX_SIMILARITY;

/// One ranked candidate
#[derive(Debug, Clone)]
pub struct Match {
    pub swatch: Arc<SwatchEntry>,
    /// Similarity score in [0, 100]; 100 - ΔE00, floored at zero
    pub similarity: f64,
    /// CIEDE2000 distance to the query
    pub delta_e: f64,
}

impl Match {
    pub fn new(swatch: Arc<SwatchEntry>, delta_e: f64) -> Self {
        Self {
            swatch,
            similarity: similarity(delta_e),
            delta_e,
        }
    }

    pub fn category(&self) -> Category {
        self.swatch.category
    }

    pub fn perceptual_category(&self) -> DeltaECategory {
        DeltaECategory::from_delta_e(self.delta_e)
    }
}

/// Similarity score for a ΔE00 value
pub fn similarity(delta_e: f64) -> f64 {
    (MAX_SIMILARITY - delta_e).clamp(0.0, MAX_SIMILARITY)
}

/// Rank every usable swatch by ΔE00 to `query`, closest first
///
/// Distances are computed in parallel. The sort is stable, so swatches at
/// equal distance keep their catalog order.
pub fn rank_catalog(set: &SwatchSet, query: Lab) -> Vec<Match> {
    let candidates: Vec<&Arc<SwatchEntry>> = set.usable().collect();
    let mut ranked: Vec<Match> = candidates
        .par_iter()
        .map(|&swatch| Match::new(Arc::clone(swatch), delta_e_2000(query, swatch.lab)))
        .collect();
    ranked.sort_by(|a, b| a.delta_e.total_cmp(&b.delta_e));
    ranked
}

/// Keep matches in `category` (all of them for `None`), at most `max_results`
pub fn filter_matches(ranked: &[Match], category: Option<Category>, max_results: usize) -> Vec<Match> {
    ranked
        .iter()
        .filter(|m| category.map_or(true, |wanted| m.category() == wanted))
        .take(max_results)
        .cloned()
        .collect()
}
