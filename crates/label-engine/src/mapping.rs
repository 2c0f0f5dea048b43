//! Label-mapping files.
//!
//! Three JSON shapes are accepted, tried in order; the first that fits wins:
//!
//! 1. `{"label_names": [...], "colors": [[r, g, b], ...]}`. Colors are
//!    optional and clamped; a shortfall is filled from the start of the palette.
//! 2. `{"0": "name", "1": "name", ...}`. Sorted by numeric key; each key picks
//!    its palette color.
//! 3. `["name", ...]`. Colors come from the palette by position.

use std::collections::BTreeMap;
use std::path::Path;

use seg_types::{palette_color, Category, Rgb, DEFAULT_PALETTE};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::EngineError;
use crate::taxonomy::LabelTaxonomy;

#[derive(Debug, Deserialize)]
struct ExplicitMapping {
    label_names: Vec<String>,
    #[serde(default)]
    colors: Vec<Vec<f64>>,
}

/// Which of the accepted shapes a mapping matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingShape {
    Explicit,
    Keyed,
    Names,
}

fn explicit(value: &Value) -> Option<Vec<Category>> {
    value.get("label_names")?;
    let mapping = ExplicitMapping::deserialize(value).ok()?;
    let mut colors: Vec<Rgb> = mapping
        .colors
        .iter()
        .take(mapping.label_names.len())
        .enumerate()
        .map(|(i, c)| {
            let channels: Vec<i64> = c.iter().map(|v| v.round() as i64).collect();
            Rgb::from_channels(&channels).unwrap_or_else(|| palette_color(i))
        })
        .collect();
    let needed = mapping.label_names.len() - colors.len();
    colors.extend((0..needed).map(palette_color));

    Some(
        mapping
            .label_names
            .into_iter()
            .zip(colors)
            .map(|(name, color)| Category::new(name, color))
            .collect(),
    )
}

fn keyed(value: &Value) -> Option<Vec<Category>> {
    let object = value.as_object()?;
    let mut sorted = BTreeMap::new();
    for (key, name) in object {
        let key: i64 = key.trim().parse().ok()?;
        sorted.insert(key, name.as_str()?.to_string());
    }
    let palette_len = DEFAULT_PALETTE.len() as i64;
    Some(
        sorted
            .into_iter()
            .map(|(key, name)| {
                Category::new(name, palette_color(key.rem_euclid(palette_len) as usize))
            })
            .collect(),
    )
}

fn names(value: &Value) -> Option<Vec<Category>> {
    let names: Vec<String> = Vec::deserialize(value).ok()?;
    Some(
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Category::new(name, palette_color(i)))
            .collect(),
    )
}

/// Parse a mapping file body into a taxonomy.
pub fn parse_mapping(json: &str) -> Result<(LabelTaxonomy, MappingShape), EngineError> {
    let value: Value = serde_json::from_str(json).map_err(|e| EngineError::MalformedLabelFile {
        reason: e.to_string(),
    })?;

    let attempts: [(MappingShape, fn(&Value) -> Option<Vec<Category>>); 3] = [
        (MappingShape::Explicit, explicit),
        (MappingShape::Keyed, keyed),
        (MappingShape::Names, names),
    ];
    for (shape, attempt) in attempts {
        if let Some(categories) = attempt(&value) {
            if categories.is_empty() {
                return Err(EngineError::MalformedLabelFile {
                    reason: "mapping defines no categories".into(),
                });
            }
            debug!(?shape, categories = categories.len(), "label mapping parsed");
            return Ok((LabelTaxonomy::from_categories(categories), shape));
        }
    }
    Err(EngineError::MalformedLabelFile {
        reason: "expected label_names/colors object, numeric-keyed object, or name array".into(),
    })
}

/// Read and parse a mapping file.
pub fn read_mapping_file(path: &Path) -> Result<LabelTaxonomy, EngineError> {
    let json = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    parse_mapping(&json).map(|(taxonomy, _)| taxonomy)
}
