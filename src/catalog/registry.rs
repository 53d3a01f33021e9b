//! The placeable-block namespace that swatch texture names resolve against

use std::collections::HashMap;

use super::swatch::{Material, Resolution};

/// What a namespace name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Can be placed in the world
    Block,
    /// Exists but only as an inventory item
    Item,
}

/// Lookup of material names; names are compared in lowercase
pub trait MaterialRegistry: Send + Sync {
    fn lookup(&self, name: &str) -> Option<MaterialKind>;

    fn is_placeable(&self, name: &str) -> bool {
        self.lookup(name) == Some(MaterialKind::Block)
    }
}

/// A registry backed by an in-memory name table
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    names: HashMap<String, MaterialKind>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry where every given name is a placeable block
    pub fn from_blocks<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.insert(name, MaterialKind::Block);
        }
        registry
    }

    pub fn insert(&mut self, name: impl AsRef<str>, kind: MaterialKind) {
        self.names.insert(name.as_ref().to_ascii_lowercase(), kind);
    }

    #[must_use]
    pub fn with_item(mut self, name: impl AsRef<str>) -> Self {
        self.insert(name, MaterialKind::Item);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl MaterialRegistry for StaticRegistry {
    fn lookup(&self, name: &str) -> Option<MaterialKind> {
        self.names.get(&name.to_ascii_lowercase()).copied()
    }
}

/// Resolve a texture name to a placeable block
///
/// Tries the full name first, then drops trailing `_`-separated segments
/// one at a time (`acacia_log_top`, `acacia_log`, `acacia`). The first
/// prefix naming a block wins; prefixes naming only an item are skipped.
pub fn resolve_material(texture_name: &str, registry: &dyn MaterialRegistry) -> Resolution {
    let segments: Vec<&str> = texture_name
        .split('_')
        .filter(|segment| !segment.is_empty())
        .collect();

    (1..=segments.len())
        .rev()
        .map(|len| segments[..len].join("_"))
        .find(|candidate| registry.is_placeable(candidate))
        .map_or(Resolution::Unresolved, |name| {
            Resolution::Resolved(Material::new(name))
        })
}
