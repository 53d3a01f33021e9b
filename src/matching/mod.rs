//! Perceptual matching of query colors against the catalog
//!
//! This module provides:
//! - Full-catalog ranking by CIEDE2000 distance
//! - Similarity scoring and category filtering
//! - A bounded LRU cache with time-based expiry over those rankings

pub mod cache;
pub mod rank;

pub use cache::{CacheStats, MatchCache};
pub use rank::{filter_matches, rank_catalog, similarity, Match};
