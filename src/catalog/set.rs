//! An immutable, indexed generation of the swatch catalog
//!
//! A [`SwatchSet`] is built in one go and never mutated afterwards; the
//! catalog replaces the whole set on reload, so readers holding an `Arc`
//! always see a complete generation.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::swatch::{Category, Material, SwatchEntry};

/// Provenance of a catalog generation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogMeta {
    /// Snapshot format version the data was stored under
    pub version: String,
    /// Epoch milliseconds of the remote fetch that produced the data
    pub last_update: u64,
    /// Endpoint the data came from
    pub api_source: String,
}

/// All known swatches plus lookup indices over the usable ones
#[derive(Debug, Default)]
pub struct SwatchSet {
    entries: IndexMap<String, Arc<SwatchEntry>>,
    by_type: IndexMap<Material, usize>,
    by_category: HashMap<Category, Vec<usize>>,
    usable: Vec<usize>,
    meta: CatalogMeta,
}

impl SwatchSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set, keeping entry order; a repeated id replaces the earlier record
    pub fn new<I>(entries: I, meta: CatalogMeta) -> Self
    where
        I: IntoIterator<Item = SwatchEntry>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.catalog_id.clone(), Arc::new(entry)))
            .collect();
        let mut set = Self {
            entries,
            meta,
            ..Self::default()
        };
        set.rebuild_indices();
        set
    }

    fn rebuild_indices(&mut self) {
        self.by_type.clear();
        self.by_category.clear();
        self.usable.clear();

        for (index, (_, entry)) in self.entries.iter().enumerate() {
            let Some(material) = entry.material() else {
                continue;
            };
            self.usable.push(index);
            self.by_type.entry(material.clone()).or_insert(index);
            self.by_category.entry(entry.category).or_default().push(index);
        }
    }

    fn at(&self, index: usize) -> Option<&Arc<SwatchEntry>> {
        self.entries.get_index(index).map(|(_, entry)| entry)
    }

    /// Number of entries, usable or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn usable_count(&self) -> usize {
        self.usable.len()
    }

    pub fn meta(&self) -> &CatalogMeta {
        &self.meta
    }

    pub fn get(&self, catalog_id: &str) -> Option<&Arc<SwatchEntry>> {
        self.entries.get(catalog_id)
    }

    /// Every entry in catalog order, including unresolved ones
    pub fn entries(&self) -> impl Iterator<Item = &Arc<SwatchEntry>> {
        self.entries.values()
    }

    /// Entries with a resolved block type, in catalog order
    pub fn usable(&self) -> impl Iterator<Item = &Arc<SwatchEntry>> {
        self.usable.iter().filter_map(|&index| self.at(index))
    }

    /// The swatch standing for a block type (the first one listed wins)
    pub fn by_type(&self, material: &Material) -> Option<&Arc<SwatchEntry>> {
        self.by_type.get(material).and_then(|&index| self.at(index))
    }

    /// One swatch per block type, in catalog order
    pub fn materials(&self) -> impl Iterator<Item = (&Material, &Arc<SwatchEntry>)> {
        self.by_type
            .iter()
            .filter_map(|(material, &index)| self.at(index).map(|entry| (material, entry)))
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Arc<SwatchEntry>> {
        self.by_category
            .get(&category)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.at(index))
    }
}
