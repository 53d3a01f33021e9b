//! Color conversion and perceptual difference
//!
//! This module handles sRGB/Lab conversion, hex encoding of packed
//! colors, and the CIEDE2000 difference metric.

pub mod conversion;
pub mod difference;

pub use conversion::{hex_to_rgb, lab_to_rgb, rgb_to_hex, rgb_to_lab, Lab, Rgb};
pub use difference::{delta_e_2000, delta_e_2000_rgb, DeltaECategory};
