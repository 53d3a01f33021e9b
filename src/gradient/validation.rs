//! Pre-flight check on a seed configuration

use std::collections::BTreeMap;

use super::interpolator::{Cell, Seed};

/// Whether `seeds` is worth interpolating
///
/// # Arguments
///
/// * `seeds` - The seed map about to be passed to the interpolator
/// * `min_seeds` - Fewer seeds than this is always invalid
/// * `ignore_transparent` - Transparent seeds do not count as color; a map
///   made only of them is invalid
/// * `ignore_same_color` - Two or more seeds that all share one color are
///   invalid, since they cannot form a gradient
///
/// # Returns
///
/// `true` when none of the enabled checks fails.
pub fn is_valid_configuration(
    seeds: &BTreeMap<Cell, Seed>,
    min_seeds: usize,
    ignore_transparent: bool,
    ignore_same_color: bool,
) -> bool {
    if seeds.len() < min_seeds {
        return false;
    }

    if ignore_transparent && seeds.values().all(Seed::is_transparent) {
        return false;
    }

    if ignore_same_color && seeds.len() >= 2 {
        let mut colors = seeds.values().map(Seed::rgb);
        if let Some(first) = colors.next() {
            if colors.all(|color| color == first) {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn seeds(list: &[(Cell, Seed)]) -> BTreeMap<Cell, Seed> {
        list.iter().cloned().collect()
    }

    fn red() -> Seed {
        Seed::opaque("red_wool", Rgb::new(160, 39, 34))
    }

    fn blue() -> Seed {
        Seed::opaque("blue_wool", Rgb::new(53, 57, 157))
    }

    #[test]
    fn test_too_few_seeds() {
        let one = seeds(&[((0, 0), red())]);
        assert!(!is_valid_configuration(&one, 2, false, false));
        assert!(is_valid_configuration(&one, 1, false, false));
        assert!(!is_valid_configuration(&BTreeMap::new(), 1, false, false));
    }

    #[test]
    fn test_all_transparent() {
        let glass = seeds(&[((0, 0), Seed::transparent("glass")), ((1, 1), Seed::transparent("air"))]);
        assert!(!is_valid_configuration(&glass, 2, true, false));
        assert!(is_valid_configuration(&glass, 2, false, false));

        let mixed = seeds(&[((0, 0), Seed::transparent("glass")), ((1, 1), red())]);
        assert!(is_valid_configuration(&mixed, 2, true, false));
    }

    #[test]
    fn test_identical_colors() {
        let same = seeds(&[
            ((0, 0), red()),
            ((3, 3), Seed::opaque("red_concrete", Rgb::new(160, 39, 34))),
        ]);
        assert!(!is_valid_configuration(&same, 2, false, true));
        assert!(is_valid_configuration(&same, 2, false, false));

        let distinct = seeds(&[((0, 0), red()), ((3, 3), blue())]);
        assert!(is_valid_configuration(&distinct, 2, true, true));
    }

    #[test]
    fn test_single_seed_is_not_same_color() {
        let one = seeds(&[((0, 0), red())]);
        assert!(is_valid_configuration(&one, 1, true, true));
    }
}
