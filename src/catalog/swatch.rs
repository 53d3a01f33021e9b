//! Swatch records and their usability state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{Lab, Rgb};

/// Which filterable subset a swatch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Building,
    Decoration,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Building, Category::Decoration];

    pub fn from_decoration_flag(is_decoration: bool) -> Self {
        if is_decoration {
            Category::Decoration
        } else {
            Category::Building
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Building => "BUILDING",
            Category::Decoration => "DECORATION",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placeable block type, by its lowercase namespace name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Material(String);

impl Material {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Material {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Whether a swatch maps onto a placeable block
///
/// Unresolved swatches are kept in the catalog for bookkeeping but never
/// indexed or matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    Resolved(Material),
    Unresolved,
}

impl Resolution {
    pub fn material(&self) -> Option<&Material> {
        match self {
            Resolution::Resolved(material) => Some(material),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// One known material and its color identity
#[derive(Debug, Clone, PartialEq)]
pub struct SwatchEntry {
    /// Stable external identifier
    pub catalog_id: String,
    /// Human label
    pub display_name: String,
    color: Rgb,
    /// Authoritative perceptual coordinate, sourced upstream
    pub lab: Lab,
    /// Underscore-delimited texture identifier
    pub texture_name: String,
    pub category: Category,
    /// Whether the upstream source renders the swatch in 3-D
    pub show_3d: bool,
    pub resolution: Resolution,
}

impl SwatchEntry {
    pub fn new(
        catalog_id: impl Into<String>,
        display_name: impl Into<String>,
        color: Rgb,
        lab: Lab,
        texture_name: impl Into<String>,
        category: Category,
        resolution: Resolution,
    ) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            display_name: display_name.into(),
            color,
            lab,
            texture_name: texture_name.into(),
            category,
            show_3d: false,
            resolution,
        }
    }

    #[must_use]
    pub fn with_show_3d(mut self, show_3d: bool) -> Self {
        self.show_3d = show_3d;
        self
    }

    pub fn rgb(&self) -> Rgb {
        self.color
    }

    pub fn hex(&self) -> String {
        self.color.to_hex()
    }

    pub fn r(&self) -> u8 {
        self.color.r()
    }

    pub fn g(&self) -> u8 {
        self.color.g()
    }

    pub fn b(&self) -> u8 {
        self.color.b()
    }

    /// Replace the display color; hex and channels follow automatically
    pub fn set_rgb(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn material(&self) -> Option<&Material> {
        self.resolution.material()
    }

    pub fn is_usable(&self) -> bool {
        self.resolution.is_resolved()
    }
}
