//! CIEDE2000 color difference
//!
//! Implements the CIE Technical Report 142-2001 formula with unit
//! parametric factors (kL = kC = kH = 1). Values are symmetric in their
//! arguments, zero for identical colors, and never negative. The typical
//! range is [0, 100] but the result is not clamped.

use std::f64::consts::PI;

use super::conversion::{Lab, Rgb};
use crate::constants::POW25_7;

/// CIEDE2000 color difference (ΔE00) between two Lab colors
pub fn delta_e_2000(lab1: Lab, lab2: Lab) -> f64 {
    let (l1, a1, b1) = (lab1.l, lab1.a, lab1.b);
    let (l2, a2, b2) = (lab2.l, lab2.a, lab2.b);

    // Chroma and the G factor that rescales a*
    let c_mean = (a1.hypot(b1) + a2.hypot(b2)) / 2.0;
    let c_mean_pow7 = c_mean.powi(7);
    let g = 0.5 * (1.0 - (c_mean_pow7 / (c_mean_pow7 + POW25_7)).sqrt());

    let a1_prime = (1.0 + g) * a1;
    let a2_prime = (1.0 + g) * a2;

    let c1_prime = a1_prime.hypot(b1);
    let c2_prime = a2_prime.hypot(b2);

    let h1_prime = hue_angle(a1_prime, b1);
    let h2_prime = hue_angle(a2_prime, b2);

    let delta_l_prime = l2 - l1;
    let delta_c_prime = c2_prime - c1_prime;

    let chroma_product = c1_prime * c2_prime;
    let delta_h_prime = if chroma_product == 0.0 {
        0.0
    } else {
        let diff = h2_prime - h1_prime;
        if diff.abs() <= 180.0 {
            diff
        } else if diff > 180.0 {
            diff - 360.0
        } else {
            diff + 360.0
        }
    };
    let delta_big_h_prime = 2.0 * chroma_product.sqrt() * (delta_h_prime.to_radians() / 2.0).sin();

    let l_prime_mean = (l1 + l2) / 2.0;
    let c_prime_mean = (c1_prime + c2_prime) / 2.0;
    let h_prime_mean = mean_hue(h1_prime, h2_prime, chroma_product);

    let t = 1.0 - 0.17 * (h_prime_mean - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_prime_mean).to_radians().cos()
        + 0.32 * (3.0 * h_prime_mean + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_prime_mean - 63.0).to_radians().cos();

    let l_offset_sq = (l_prime_mean - 50.0).powi(2);
    let sl = 1.0 + (0.015 * l_offset_sq) / (20.0 + l_offset_sq).sqrt();
    let sc = 1.0 + 0.045 * c_prime_mean;
    let sh = 1.0 + 0.015 * c_prime_mean * t;

    // Rotation term for the blue region
    let delta_theta = 30.0 * (-((h_prime_mean - 275.0) / 25.0).powi(2)).exp();
    let c_prime_mean_pow7 = c_prime_mean.powi(7);
    let rc = 2.0 * (c_prime_mean_pow7 / (c_prime_mean_pow7 + POW25_7)).sqrt();
    let rt = -(2.0 * delta_theta).to_radians().sin() * rc;

    let term_l = delta_l_prime / sl;
    let term_c = delta_c_prime / sc;
    let term_h = delta_big_h_prime / sh;

    (term_l * term_l + term_c * term_c + term_h * term_h + rt * term_c * term_h)
        .max(0.0)
        .sqrt()
}

/// CIEDE2000 between two sRGB colors
pub fn delta_e_2000_rgb(rgb1: Rgb, rgb2: Rgb) -> f64 {
    delta_e_2000(rgb1.to_lab(), rgb2.to_lab())
}

/// Hue angle in degrees, normalized to [0, 360); zero for the neutral axis
fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a) * 180.0 / PI;
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}

fn mean_hue(h1: f64, h2: f64, chroma_product: f64) -> f64 {
    if chroma_product == 0.0 {
        return h1 + h2;
    }
    if (h1 - h2).abs() <= 180.0 {
        (h1 + h2) / 2.0
    } else if h1 + h2 < 360.0 {
        (h1 + h2 + 360.0) / 2.0
    } else {
        (h1 + h2 - 360.0) / 2.0
    }
}

/// Perceptual bucket for a ΔE00 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaECategory {
    /// ΔE00 < 1.0
    Imperceptible,
    /// ΔE00 in [1.0, 2.0)
    BarelyPerceptible,
    /// ΔE00 in [2.0, 10.0)
    Noticeable,
    /// ΔE00 in [10.0, 50.0)
    Distinct,
    /// ΔE00 >= 50.0
    VeryDistinct,
}

impl DeltaECategory {
    pub fn from_delta_e(delta_e: f64) -> Self {
        if delta_e < 1.0 {
            Self::Imperceptible
        } else if delta_e < 2.0 {
            Self::BarelyPerceptible
        } else if delta_e < 10.0 {
            Self::Noticeable
        } else if delta_e < 50.0 {
            Self::Distinct
        } else {
            Self::VeryDistinct
        }
    }
}
