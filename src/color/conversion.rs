//! Color space conversion utilities
//!
//! Provides conversions between display sRGB and CIELAB:
//! - 8-bit sRGB to Lab (D65) through `palette`
//! - Lab back to 8-bit sRGB with gamut clamping
//! - Lossless hex encoding of packed 24-bit colors
//!
//! All functions are pure. Callers that want memoization keep their own
//! table keyed by [`Rgb`].

use std::fmt;
use std::str::FromStr;

use palette::{FromColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// CIE L*a*b* under D65, in double precision
pub type Lab = palette::Lab<palette::white_point::D65, f64>;

/// A packed 24-bit sRGB color (`0xRRGGBB`)
///
/// The packed value is the only stored state, so the channel accessors and
/// the hex form can never disagree with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Build from a packed integer; bits above 24 are discarded
    pub const fn from_packed(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn components(self) -> [u8; 3] {
        [self.r(), self.g(), self.b()]
    }

    pub fn to_lab(self) -> Lab {
        rgb_to_lab(self.r(), self.g(), self.b())
    }

    pub fn to_hex(self) -> String {
        rgb_to_hex(self)
    }

    /// Squared Euclidean distance between the two colors' 8-bit channels
    pub fn distance_squared(self, other: Rgb) -> u32 {
        self.components()
            .iter()
            .zip(other.components())
            .map(|(&a, b)| {
                let d = i32::from(a) - i32::from(b);
                d.unsigned_abs() * d.unsigned_abs()
            })
            .sum()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// Convert 8-bit sRGB to Lab (D65)
///
/// # Arguments
///
/// * `r`, `g`, `b` - sRGB channels in range [0, 255]
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    Lab::from_color(Srgb::new(r, g, b).into_format::<f64>().into_linear())
}

/// Convert Lab (D65) to 8-bit sRGB
///
/// Out-of-gamut colors are clamped per channel.
pub fn lab_to_rgb(lab: Lab) -> Rgb {
    let srgb = Srgb::<f64>::from_color(lab);
    let clamped = Srgb::new(
        srgb.red.clamp(0.0, 1.0),
        srgb.green.clamp(0.0, 1.0),
        srgb.blue.clamp(0.0, 1.0),
    );
    let channels: Srgb<u8> = clamped.into_format();
    Rgb::new(channels.red, channels.green, channels.blue)
}

/// Parse a hexadecimal color string
///
/// Accepts `"#RRGGBB"` or `"RRGGBB"`, either case.
///
/// # Errors
///
/// Returns [`ColorError::InvalidHex`] for anything else.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex {
            input: hex.to_string(),
        });
    }
    u32::from_str_radix(digits, 16)
        .map(Rgb::from_packed)
        .map_err(|_| ColorError::InvalidHex {
            input: hex.to_string(),
        })
}

/// Format a color as `"#RRGGBB"`
pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::d65;
    use palette::white_point::D65;
    use palette::Xyz;

    #[test]
    fn test_rgb_to_lab_black() {
        let lab = rgb_to_lab(0, 0, 0);
        assert!(lab.l.abs() < 1e-9);
        assert!(lab.a.abs() < 1e-9);
        assert!(lab.b.abs() < 1e-9);
    }

    #[test]
    fn test_rgb_to_lab_white() {
        let lab = rgb_to_lab(255, 255, 255);
        assert!((lab.l - 100.0).abs() < 0.01);
        assert!(lab.a.abs() < 0.01);
        assert!(lab.b.abs() < 0.01);
    }

    #[test]
    fn test_rgb_to_lab_primaries() {
        // Well-known D65 values
        let red = rgb_to_lab(255, 0, 0);
        assert!((red.l - 53.24).abs() < 0.05, "L = {}", red.l);
        assert!((red.a - 80.09).abs() < 0.05, "a = {}", red.a);
        assert!((red.b - 67.20).abs() < 0.05, "b = {}", red.b);

        let blue = rgb_to_lab(0, 0, 255);
        assert!((blue.l - 32.30).abs() < 0.05, "L = {}", blue.l);
        assert!((blue.a - 79.19).abs() < 0.05, "a = {}", blue.a);
        assert!((blue.b + 107.86).abs() < 0.05, "b = {}", blue.b);
    }

    #[test]
    fn test_rgb_to_lab_grays_are_neutral() {
        let mut previous = -1.0;
        for v in [1u8, 32, 64, 128, 200, 254] {
            let lab = rgb_to_lab(v, v, v);
            assert!(lab.a.abs() < 0.01, "{v}: a = {}", lab.a);
            assert!(lab.b.abs() < 0.01, "{v}: b = {}", lab.b);
            assert!(lab.l > previous, "lightness must grow with the channel value");
            previous = lab.l;
        }
    }

    #[test]
    fn test_white_maps_to_d65_reference() {
        let white: Xyz<D65, f64> = Xyz::from_color(Srgb::new(255u8, 255, 255).into_format::<f64>().into_linear());
        for (channel, reference) in [white.x, white.y, white.z].iter().zip(d65::WHITE_POINT_XYZ) {
            assert!((channel * 100.0 - reference).abs() < 0.01, "{channel} vs {reference}");
        }
    }

    #[test]
    fn test_lab_round_trip_sample_grid() {
        for r in (0..=255u16).step_by(15) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(51) {
                    let original = Rgb::new(r as u8, g as u8, b as u8);
                    let back = lab_to_rgb(original.to_lab());
                    for (x, y) in original.components().iter().zip(back.components()) {
                        assert!(
                            (i16::from(*x) - i16::from(y)).abs() <= 1,
                            "{original} came back as {back}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_lab_to_rgb_clamps_out_of_gamut() {
        let extreme = Lab::new(50.0, 120.0, 120.0);
        let rgb = lab_to_rgb(extreme);
        assert_eq!(rgb.r(), 255);
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex(Rgb::new(255, 0, 0)), "#FF0000");
        assert_eq!(rgb_to_hex(Rgb::new(0, 255, 0)), "#00FF00");
        assert_eq!(rgb_to_hex(Rgb::new(0, 0, 255)), "#0000FF");
        assert_eq!(rgb_to_hex(Rgb::new(1, 2, 3)), "#010203");
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF0000"), Ok(Rgb::new(255, 0, 0)));
        assert_eq!(hex_to_rgb("00ff00"), Ok(Rgb::new(0, 255, 0))); // Test without #
        assert_eq!("#0A0B0C".parse::<Rgb>(), Ok(Rgb::new(10, 11, 12)));
    }

    #[test]
    fn test_hex_to_rgb_invalid() {
        assert!(hex_to_rgb("#FF").is_err()); // Too short
        assert!(hex_to_rgb("#GGGGGG").is_err()); // Invalid chars
        assert!(hex_to_rgb("+FFFFF").is_err()); // Sign is not a digit
        assert!(hex_to_rgb("#FF00000").is_err()); // Too long
        assert!(hex_to_rgb("ééé").is_err()); // Six bytes, not six digits
        assert!(hex_to_rgb("").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        for packed in [0x000000, 0xFFFFFF, 0x123456, 0xABCDEF, 0x00FF7F] {
            let rgb = Rgb::from_packed(packed);
            assert_eq!(hex_to_rgb(&rgb_to_hex(rgb)), Ok(rgb));
        }
    }

    #[test]
    fn test_rgb_components_consistent() {
        let rgb = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(rgb.packed(), 0x123456);
        assert_eq!(rgb.components(), [0x12, 0x34, 0x56]);
        assert_eq!(Rgb::from_packed(0xFF12_3456), rgb);
    }

    #[test]
    fn test_distance_squared() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(3, 4, 0);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(b.distance_squared(a), 25);
    }
}
