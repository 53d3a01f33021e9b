//! # Swatch Gradient
//!
//! A Rust crate for matching colors against a catalog of material swatches
//! and synthesizing gradients between sparse seed colors.
//!
//! This library provides:
//! - sRGB ↔ CIE Lab conversion and CIEDE2000 color difference
//! - A swatch catalog fetched from a remote feed, with retry and a local
//!   snapshot fallback
//! - A bounded, time-expiring cache of perceptual match rankings
//! - Inverse-distance gradient interpolation over a grid, snapped to an
//!   allow-list of materials
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swatch_gradient::{EngineConfig, GradientEngine, Rgb, StaticAllowList, StaticRegistry};
//!
//! let registry = Arc::new(StaticRegistry::from_blocks(["stone", "red_wool"]));
//! let allow = StaticAllowList::new(["stone", "red_wool"]);
//! let engine = GradientEngine::with_http(EngineConfig::default(), registry, Box::new(allow));
//!
//! if engine.reload_catalog() {
//!     for m in engine.find_matches(Rgb::new(160, 39, 34), None, 5) {
//!         println!("{} {:.1}", m.swatch.display_name, m.similarity);
//!     }
//! }
//! ```

pub mod catalog;
pub mod clock;
pub mod color;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod gradient;
pub mod matching;

pub use catalog::{
    Category, Material, MaterialKind, MaterialRegistry, StaticRegistry, SwatchCatalog, SwatchEntry, SwatchSet,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use color::{delta_e_2000, hex_to_rgb, lab_to_rgb, rgb_to_hex, rgb_to_lab, DeltaECategory, Lab, Rgb};
pub use config::EngineConfig;
pub use engine::{AllowListProvider, GradientEngine, StaticAllowList};
pub use error::{CatalogError, ColorError, ConfigError, Result};
pub use gradient::{is_valid_configuration, Cell, GradientGrid, GradientInterpolator, Seed};
pub use matching::{CacheStats, Match, MatchCache};
