use std::path::Path;

use label_engine::LabelTaxonomy;
use serde::Serialize;
use seg_types::Rgb;

use crate::errors::FormatError;

#[derive(Serialize)]
struct ExplicitMapping<'a> {
    label_names: &'a [String],
    colors: &'a [Rgb],
}

/// Taxonomy as an explicit `{"label_names", "colors"}` mapping document.
pub fn taxonomy_to_json(taxonomy: &LabelTaxonomy) -> Result<String, FormatError> {
    let names = taxonomy.names();
    let colors = taxonomy.colors();
    let doc = ExplicitMapping {
        label_names: &names,
        colors: &colors,
    };
    serde_json::to_string_pretty(&doc).map_err(|e| FormatError::Serialize(e.to_string()))
}

/// Write a mapping file that reloads to the same names and colors.
pub fn write_taxonomy(path: &Path, taxonomy: &LabelTaxonomy) -> Result<(), FormatError> {
    let json = taxonomy_to_json(taxonomy)?;
    std::fs::write(path, json).map_err(|e| FormatError::io(path, e))
}
