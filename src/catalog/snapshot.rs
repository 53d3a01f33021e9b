//! Local snapshot of the catalog
//!
//! The snapshot is a JSON document with the catalog provenance at the top
//! level and one `blocks.<id>` record per swatch. Records are read back one
//! at a time, so a single damaged record does not invalidate the file.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::registry::{resolve_material, MaterialRegistry};
use super::set::{CatalogMeta, SwatchSet};
use super::swatch::{Category, Material, Resolution, SwatchEntry};
use crate::color::{hex_to_rgb, Lab, Rgb};
use crate::error::{CatalogError, Result};

/// The persisted catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub version: String,
    /// Epoch milliseconds of the fetch that produced the data
    pub last_update: u64,
    pub api_source: String,
    pub total_blocks: usize,
    pub blocks: IndexMap<String, Value>,
}

/// One persisted swatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBlock {
    pub display_name: String,
    pub hex: String,
    pub rgb: u32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default)]
    pub lab: Option<[f64; 3]>,
    pub texture_name: String,
    /// Resolved block type, absent when unresolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    pub is_decoration: bool,
    #[serde(default)]
    pub show_3d: bool,
    pub category: Category,
}

impl From<&SwatchEntry> for SnapshotBlock {
    fn from(entry: &SwatchEntry) -> Self {
        let rgb = entry.rgb();
        Self {
            display_name: entry.display_name.clone(),
            hex: rgb.to_hex(),
            rgb: rgb.packed(),
            r: rgb.r(),
            g: rgb.g(),
            b: rgb.b(),
            lab: Some([entry.lab.l, entry.lab.a, entry.lab.b]),
            texture_name: entry.texture_name.clone(),
            material: entry.material().map(|m| m.as_str().to_string()),
            is_decoration: entry.category == Category::Decoration,
            show_3d: entry.show_3d,
            category: entry.category,
        }
    }
}

impl SnapshotBlock {
    /// Turn the record back into a swatch
    ///
    /// The stored block type is kept if the registry still knows it as a
    /// placeable block; otherwise it is resolved again from the texture
    /// name. A missing Lab value is recomputed from the color.
    fn into_entry(self, id: &str, registry: &dyn MaterialRegistry) -> Result<SwatchEntry> {
        let color = self.color(id)?;
        let lab = match self.lab {
            Some([l, a, b]) => Lab::new(l, a, b),
            None => color.to_lab(),
        };
        let resolution = match self.material.as_deref() {
            Some(name) if registry.is_placeable(name) => Resolution::Resolved(Material::new(name)),
            _ => resolve_material(&self.texture_name, registry),
        };

        Ok(SwatchEntry::new(
            id,
            self.display_name,
            color,
            lab,
            self.texture_name,
            self.category,
            resolution,
        )
        .with_show_3d(self.show_3d))
    }

    /// The packed value wins over hex if the two disagree
    fn color(&self, id: &str) -> Result<Rgb> {
        let packed = Rgb::from_packed(self.rgb);
        match hex_to_rgb(&self.hex) {
            Ok(hex) if hex != packed => {
                log::warn!(
                    "Snapshot record '{}' has hex {} but rgb {}; using rgb",
                    id,
                    self.hex,
                    packed
                );
                Ok(packed)
            }
            Ok(_) => Ok(packed),
            Err(_) if self.rgb <= 0x00FF_FFFF => Ok(packed),
            Err(e) => Err(CatalogError::invalid_record(id, e.to_string())),
        }
    }
}

impl SnapshotDocument {
    pub fn from_set(set: &SwatchSet) -> Self {
        let meta = set.meta();
        let blocks: IndexMap<String, Value> = set
            .entries()
            .filter_map(|entry| {
                serde_json::to_value(SnapshotBlock::from(entry.as_ref()))
                    .map(|value| (entry.catalog_id.clone(), value))
                    .map_err(|e| log::warn!("Cannot serialize '{}': {}", entry.catalog_id, e))
                    .ok()
            })
            .collect();
        Self {
            version: meta.version.clone(),
            last_update: meta.last_update,
            api_source: meta.api_source.clone(),
            total_blocks: blocks.len(),
            blocks,
        }
    }

    pub fn meta(&self) -> CatalogMeta {
        CatalogMeta {
            version: self.version.clone(),
            last_update: self.last_update,
            api_source: self.api_source.clone(),
        }
    }

    /// Rebuild a swatch set, collecting rejected records instead of failing
    pub fn into_set(self, registry: &dyn MaterialRegistry) -> (SwatchSet, Vec<CatalogError>) {
        let meta = self.meta();
        let mut entries = Vec::with_capacity(self.blocks.len());
        let mut rejected = Vec::new();

        for (id, value) in self.blocks {
            let block = serde_json::from_value::<SnapshotBlock>(value)
                .map_err(|e| CatalogError::invalid_record(&id, e.to_string()))
                .and_then(|block| block.into_entry(&id, registry));
            match block {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    log::warn!("Skipping snapshot record: {}", e);
                    rejected.push(e);
                }
            }
        }

        if entries.len() + rejected.len() != self.total_blocks {
            log::warn!(
                "Snapshot declares {} blocks but holds {}",
                self.total_blocks,
                entries.len() + rejected.len()
            );
        }
        (SwatchSet::new(entries, meta), rejected)
    }
}

/// Read a snapshot document from disk
///
/// # Errors
///
/// Returns [`CatalogError::MissingSnapshot`] if the file does not exist and
/// [`CatalogError::Persistence`] if it cannot be read or parsed.
pub fn read_snapshot(path: &Path) -> Result<SnapshotDocument> {
    if !path.exists() {
        return Err(CatalogError::MissingSnapshot {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)
        .map_err(|e| CatalogError::persistence(path, "read failed", e))?;
    serde_json::from_str(&content).map_err(|e| CatalogError::persistence(path, "parse failed", e))
}

/// Write a snapshot document to disk
///
/// The document goes to a sibling temporary file first and is renamed into
/// place, so a crash never leaves a half-written snapshot behind.
///
/// # Errors
///
/// Returns [`CatalogError::Persistence`] on any I/O or encoding failure.
pub fn write_snapshot(path: &Path, document: &SnapshotDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CatalogError::persistence(path, "cannot create directory", e))?;
    }

    let json = serde_json::to_string_pretty(document)
        .map_err(|e| CatalogError::persistence(path, "encode failed", e))?;

    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|e| CatalogError::persistence(&staging, "write failed", e))?;
    fs::rename(&staging, path).map_err(|e| CatalogError::persistence(path, "rename failed", e))?;

    log::info!("Saved catalog snapshot to {:?}", path);
    Ok(())
}
