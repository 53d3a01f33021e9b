//! Gradient synthesis from sparse seed colors
//!
//! This module handles:
//! - Inverse-distance blending of seed colors across a grid
//! - Snapping blended colors to allowed materials
//! - Validity checks on seed configurations

pub mod interpolator;
pub mod validation;

pub use interpolator::{closest_in_allow_list, Cell, GradientGrid, GradientInterpolator, Seed, SeedColor};
pub use validation::is_valid_configuration;
