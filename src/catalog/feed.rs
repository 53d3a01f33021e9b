//! Parsing of the remote swatch feed
//!
//! The feed is a JSON object keyed by catalog id. Each record is parsed on
//! its own; a malformed record is logged and skipped without affecting the
//! others.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::registry::{resolve_material, MaterialRegistry};
use super::swatch::{Category, SwatchEntry};
use crate::color::{hex_to_rgb, Lab};
use crate::error::{CatalogError, Result};

/// One feed record as sent by the server
#[derive(Debug, Clone, Deserialize)]
struct FeedRecord {
    display_name: String,
    hex: String,
    texture_name: String,
    is_decoration: bool,
    #[serde(default)]
    show_3d: bool,
    lab: [f64; 3],
}

/// Outcome of parsing a whole feed document
#[derive(Debug, Default)]
pub struct ParsedFeed {
    /// Accepted entries, in document order
    pub entries: Vec<SwatchEntry>,
    /// Rejections, in document order
    pub rejected: Vec<CatalogError>,
}

impl ParsedFeed {
    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_usable()).count()
    }
}

/// Parse a feed document
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] only when the body is not a JSON object.
/// Bad individual records end up in [`ParsedFeed::rejected`].
pub fn parse_feed(body: &str, registry: &dyn MaterialRegistry) -> Result<ParsedFeed> {
    let records: IndexMap<String, Value> =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse {
            message: "feed is not a JSON object of records".to_string(),
            source: Some(e),
        })?;

    let mut parsed = ParsedFeed::default();
    for (id, value) in records {
        match parse_record(&id, value, registry) {
            Ok(entry) => parsed.entries.push(entry),
            Err(e) => {
                log::warn!("Skipping catalog record: {}", e);
                parsed.rejected.push(e);
            }
        }
    }
    Ok(parsed)
}

/// Parse one feed record
///
/// # Errors
///
/// Returns [`CatalogError::InvalidRecord`] if a required field is missing
/// or has the wrong shape, or if the hex color is malformed.
pub fn parse_record(id: &str, value: Value, registry: &dyn MaterialRegistry) -> Result<SwatchEntry> {
    let record: FeedRecord =
        serde_json::from_value(value).map_err(|e| CatalogError::invalid_record(id, e.to_string()))?;

    let color = hex_to_rgb(&record.hex).map_err(|e| CatalogError::invalid_record(id, e.to_string()))?;
    let [l, a, b] = record.lab;
    if !(l.is_finite() && a.is_finite() && b.is_finite()) {
        return Err(CatalogError::invalid_record(id, "lab contains a non-finite value"));
    }

    let resolution = resolve_material(&record.texture_name, registry);
    if !resolution.is_resolved() {
        log::debug!(
            "No placeable block for '{}' (texture {})",
            id,
            record.texture_name
        );
    }

    Ok(SwatchEntry::new(
        id,
        record.display_name,
        color,
        Lab::new(l, a, b),
        record.texture_name,
        Category::from_decoration_flag(record.is_decoration),
        resolution,
    )
    .with_show_3d(record.show_3d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::registry::StaticRegistry;
    use crate::catalog::swatch::Material;
    use crate::color::Rgb;
    use serde_json::json;

    fn registry() -> StaticRegistry {
        StaticRegistry::from_blocks(["stone", "red_wool", "oak_leaves"])
    }

    #[test]
    fn test_parse_valid_record() {
        let value = json!({
            "display_name": "Red Wool",
            "hex": "#A12722",
            "texture_name": "red_wool",
            "is_decoration": false,
            "show_3d": true,
            "lab": [36.0, 52.1, 33.5]
        });
        let entry = parse_record("red_wool", value, &registry()).unwrap();

        assert_eq!(entry.catalog_id, "red_wool");
        assert_eq!(entry.display_name, "Red Wool");
        assert_eq!(entry.rgb(), Rgb::new(0xA1, 0x27, 0x22));
        assert_eq!(entry.category, Category::Building);
        assert!(entry.show_3d);
        assert_eq!(entry.material(), Some(&Material::new("red_wool")));
        assert!((entry.lab.a - 52.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let value = json!({
            "display_name": "Stone",
            "texture_name": "stone",
            "is_decoration": false,
            "lab": [50.0, 0.0, 0.0]
        });
        let err = parse_record("stone", value, &registry()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { ref id, .. } if id == "stone"));
    }

    #[test]
    fn test_short_lab_is_rejected() {
        let value = json!({
            "display_name": "Stone",
            "hex": "#7D7D7D",
            "texture_name": "stone",
            "is_decoration": false,
            "lab": [50.0, 0.0]
        });
        assert!(parse_record("stone", value, &registry()).is_err());
    }

    #[test]
    fn test_bad_hex_is_rejected() {
        let value = json!({
            "display_name": "Stone",
            "hex": "grey",
            "texture_name": "stone",
            "is_decoration": false,
            "lab": [50.0, 0.0, 0.0]
        });
        assert!(parse_record("stone", value, &registry()).is_err());
    }

    #[test]
    fn test_feed_skips_bad_records_and_keeps_order() {
        let body = r##"{
            "stone": {"display_name": "Stone", "hex": "#7D7D7D", "texture_name": "stone",
                      "is_decoration": false, "show_3d": false, "lab": [52.0, 0.0, 0.0]},
            "broken": {"display_name": "Broken"},
            "oak_leaves": {"display_name": "Oak Leaves", "hex": "#4A7A2B", "texture_name": "oak_leaves",
                           "is_decoration": true, "show_3d": true, "lab": [46.0, -28.0, 33.0]},
            "glow_lichen": {"display_name": "Glow Lichen", "hex": "#70837A", "texture_name": "glow_lichen",
                            "is_decoration": true, "show_3d": false, "lab": [53.0, -7.0, 1.0]}
        }"##;
        let parsed = parse_feed(body, &registry()).unwrap();

        let ids: Vec<&str> = parsed.entries.iter().map(|e| e.catalog_id.as_str()).collect();
        assert_eq!(ids, ["stone", "oak_leaves", "glow_lichen"]);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.resolved_count(), 2);
        assert_eq!(parsed.entries[1].category, Category::Decoration);
    }

    #[test]
    fn test_feed_that_is_not_an_object() {
        assert!(matches!(
            parse_feed("[1, 2, 3]", &registry()),
            Err(CatalogError::Parse { .. })
        ));
        assert!(parse_feed("not json", &registry()).is_err());
    }
}
