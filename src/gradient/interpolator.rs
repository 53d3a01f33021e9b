//! Inverse-distance gradient synthesis over a fixed grid
//!
//! Seeds are blended in RGB with weights `1 / (d² + bias)`, where `d` is the
//! distance between grid positions. Each blended color is then snapped to
//! the nearest allow-listed material by plain RGB distance.

use std::collections::{BTreeMap, HashSet};

use crate::catalog::{Material, SwatchSet};
use crate::color::{lab_to_rgb, Lab, Rgb};
use crate::config::GradientConfig;

/// Grid position as `(row, col)`
pub type Cell = (usize, usize);

/// Resolved color of an opaque seed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedColor {
    pub rgb: Rgb,
    pub lab: Lab,
}

/// A user-placed anchor cell
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    /// Identifier copied into the output grid for this cell
    pub swatch_id: String,
    /// `None` for a fully transparent seed, which anchors its cell but
    /// takes no part in blending
    pub color: Option<SeedColor>,
}

impl Seed {
    pub fn opaque(swatch_id: impl Into<String>, rgb: Rgb) -> Self {
        Self {
            swatch_id: swatch_id.into(),
            color: Some(SeedColor {
                rgb,
                lab: rgb.to_lab(),
            }),
        }
    }

    /// A seed known only by its Lab coordinate
    pub fn from_lab(swatch_id: impl Into<String>, lab: Lab) -> Self {
        Self {
            swatch_id: swatch_id.into(),
            color: Some(SeedColor {
                rgb: lab_to_rgb(lab),
                lab,
            }),
        }
    }

    pub fn transparent(swatch_id: impl Into<String>) -> Self {
        Self {
            swatch_id: swatch_id.into(),
            color: None,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.color.is_none()
    }

    pub fn rgb(&self) -> Option<Rgb> {
        self.color.map(|color| color.rgb)
    }
}

/// Dense result of an interpolation: cell → material identifier
///
/// Cells whose color could not be matched to any allowed material are
/// absent rather than filled with a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradientGrid {
    rows: usize,
    cols: usize,
    cells: BTreeMap<Cell, String>,
}

impl GradientGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: BTreeMap::new(),
        }
    }

    /// `(rows, cols)`
    pub fn bounds(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(&(row, col)).map(String::as_str)
    }

    /// Filled cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &str)> {
        self.cells.iter().map(|(&cell, id)| (cell, id.as_str()))
    }

    /// Number of filled cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether every cell within bounds is filled
    pub fn is_complete(&self) -> bool {
        self.cells.len() == self.rows * self.cols
    }

    pub fn into_cells(self) -> BTreeMap<Cell, String> {
        self.cells
    }

    fn contains(&self, (row, col): Cell) -> bool {
        row < self.rows && col < self.cols
    }

    fn insert(&mut self, cell: Cell, id: impl Into<String>) {
        if self.contains(cell) {
            self.cells.insert(cell, id.into());
        }
    }
}

/// An opaque seed as a point in grid space
#[derive(Debug, Clone, Copy)]
struct ColorPoint<'a> {
    row: f64,
    col: f64,
    rgb: Rgb,
    source: &'a str,
}

impl ColorPoint<'_> {
    fn distance_squared(&self, row: usize, col: usize) -> f64 {
        let dr = row as f64 - self.row;
        let dc = col as f64 - self.col;
        dr * dr + dc * dc
    }
}

/// Stateless gradient synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct GradientInterpolator {
    coincidence_epsilon: f64,
    weight_bias: f64,
}

impl Default for GradientInterpolator {
    fn default() -> Self {
        Self::new(&GradientConfig::default())
    }
}

impl GradientInterpolator {
    pub fn new(config: &GradientConfig) -> Self {
        Self {
            coincidence_epsilon: config.coincidence_epsilon,
            weight_bias: config.weight_bias,
        }
    }

    /// Fill a `rows × cols` grid from `seeds`, using only materials in
    /// `allow_list`
    ///
    /// # Arguments
    ///
    /// * `seeds` - Anchor cells; transparent seeds are kept in place but do
    ///   not contribute color
    /// * `rows`, `cols` - Grid bounds; seeds outside them are ignored
    /// * `set` - Catalog generation supplying one swatch color per material
    /// * `allow_list` - Materials the requester may use
    ///
    /// # Returns
    ///
    /// An empty grid when no seed carries a color. With a single colored
    /// seed every cell takes that seed's identifier. Otherwise each
    /// non-seed cell holds the allowed material closest to its blended
    /// color, or stays empty when no allowed material is in the catalog.
    /// Seed cells always hold their own identifier.
    pub fn calculate_gradient(
        &self,
        seeds: &BTreeMap<Cell, Seed>,
        rows: usize,
        cols: usize,
        set: &SwatchSet,
        allow_list: &HashSet<Material>,
    ) -> GradientGrid {
        self.fill(seeds, rows, cols, |color| {
            closest_in_allow_list(color, set, allow_list).map(|material| material.to_string())
        })
    }

    /// Same as [`calculate_gradient`](Self::calculate_gradient), resolving
    /// each blended color with a caller-supplied lookup
    pub fn fill<F>(&self, seeds: &BTreeMap<Cell, Seed>, rows: usize, cols: usize, mut resolve: F) -> GradientGrid
    where
        F: FnMut(Rgb) -> Option<String>,
    {
        let mut grid = GradientGrid::new(rows, cols);
        let points = color_points(seeds, rows, cols);

        match points.as_slice() {
            [] => {
                log::debug!("No colored seeds, gradient left empty");
                return grid;
            }
            [only] => {
                for row in 0..rows {
                    for col in 0..cols {
                        grid.insert((row, col), only.source);
                    }
                }
            }
            _ => {
                let mut unresolved = 0usize;
                for (cell, color) in self.synthesize(seeds, rows, cols) {
                    match resolve(color) {
                        Some(id) => grid.insert(cell, id),
                        None => unresolved += 1,
                    }
                }
                if unresolved > 0 {
                    log::debug!("{} gradient cells had no allowed material", unresolved);
                }
            }
        }

        for (&cell, seed) in seeds {
            grid.insert(cell, seed.swatch_id.as_str());
        }
        grid
    }

    /// Blended color for every non-seed cell
    ///
    /// Empty unless at least two seeds carry a color.
    pub fn synthesize(&self, seeds: &BTreeMap<Cell, Seed>, rows: usize, cols: usize) -> BTreeMap<Cell, Rgb> {
        let points = color_points(seeds, rows, cols);
        let mut colors = BTreeMap::new();
        if points.len() < 2 {
            return colors;
        }

        for row in 0..rows {
            for col in 0..cols {
                if seeds.contains_key(&(row, col)) {
                    continue;
                }
                colors.insert((row, col), self.blend(&points, row, col));
            }
        }
        colors
    }

    /// Inverse-distance blend of `points` at one cell
    ///
    /// A cell within `coincidence_epsilon` of a point takes that point's
    /// color unchanged. `synthesize` skips seed cells, so this only fires
    /// when a caller blends at a seed's own position.
    fn blend(&self, points: &[ColorPoint], row: usize, col: usize) -> Rgb {
        let distances: Vec<f64> = points.iter().map(|p| p.distance_squared(row, col)).collect();

        let nearest = distances
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1));
        if let Some((index, &d2)) = nearest {
            if d2.sqrt() < self.coincidence_epsilon {
                return points[index].rgb;
            }
        }

        let weights: Vec<f64> = distances.iter().map(|d2| 1.0 / (d2 + self.weight_bias)).collect();
        let total: f64 = weights.iter().sum();

        let mut channels = [0.0f64; 3];
        for (point, weight) in points.iter().zip(&weights) {
            let share = weight / total;
            for (channel, value) in channels.iter_mut().zip(point.rgb.components()) {
                *channel += share * f64::from(value);
            }
        }
        // Float-to-int `as` truncates and saturates at the channel bounds
        let [r, g, b] = channels.map(|c| c as u8);
        Rgb::new(r, g, b)
    }
}

fn color_points(seeds: &BTreeMap<Cell, Seed>, rows: usize, cols: usize) -> Vec<ColorPoint<'_>> {
    seeds
        .iter()
        .filter(|(&(row, col), _)| row < rows && col < cols)
        .filter_map(|(&(row, col), seed)| {
            seed.rgb().map(|rgb| ColorPoint {
                row: row as f64,
                col: col as f64,
                rgb,
                source: seed.swatch_id.as_str(),
            })
        })
        .collect()
}

/// The allowed material whose catalog color is nearest `color` in RGB
///
/// Distance is plain Euclidean over the 8-bit channels. Ties go to the
/// material listed first in the catalog. Returns `None` when no allowed
/// material has a usable swatch.
pub fn closest_in_allow_list<'a>(
    color: Rgb,
    set: &'a SwatchSet,
    allow_list: &HashSet<Material>,
) -> Option<&'a Material> {
    set.materials()
        .filter(|(material, _)| allow_list.contains(*material))
        .min_by_key(|(_, swatch)| color.distance_squared(swatch.rgb()))
        .map(|(material, _)| material)
}
