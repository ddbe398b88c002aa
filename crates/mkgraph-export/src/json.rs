//! JSON export.

use std::fs;
use std::path::Path;

use serde_json::json;

use mkgraph_core::{EntityRecord, Result};

/// Flat JSON projection of the entity list.
pub fn entities_to_json(entities: &[EntityRecord]) -> serde_json::Value {
    json!({
        "entities": entities
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "type": e.entity_type.tag(),
                    "description": e.description,
                    "sources": e.sources,
                })
            })
            .collect::<Vec<_>>(),
    })
}

/// Write the entity list as pretty JSON.
pub fn export_to_json(entities: &[EntityRecord], output_path: &Path) -> Result<()> {
    let data = entities_to_json(entities);
    fs::write(output_path, serde_json::to_string_pretty(&data)?)?;
    Ok(())
}
