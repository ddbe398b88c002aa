//! Re-parse a knowledge graph directory into flat entity records.
//!
//! The inverse projection of note synthesis: name from filename, type from
//! directory, description from the first body paragraph, sources from the
//! `## Sources` list. The heading and source set round-trip losslessly
//! against what the synthesizer wrote.

use std::fs;
use std::path::Path;

use tracing::debug;

use mkgraph_core::{EntityRecord, EntityType, GraphConfig, NoteDocument, Result};

/// Load all entity records from a knowledge graph directory.
pub fn load_entities(directory: &Path, config: &GraphConfig) -> Result<Vec<EntityRecord>> {
    let mut entities = Vec::new();

    for entity_type in EntityType::ALL {
        let type_dir = directory.join(config.directory_for(entity_type));
        if !type_dir.is_dir() {
            continue;
        }

        let mut paths: Vec<_> = fs::read_dir(&type_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "md").unwrap_or(false))
            .collect();
        paths.sort();

        for path in paths {
            let text = fs::read_to_string(&path)?;
            let doc = NoteDocument::parse(&text);

            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut sources = doc.section_sources();
            if sources.is_empty() {
                sources = doc
                    .metadata_sources()
                    .map(|s| s.to_vec())
                    .unwrap_or_default();
            }

            let mut record = EntityRecord::new(
                name,
                entity_type,
                doc.first_paragraph().unwrap_or_default(),
            );
            for source in sources {
                record.push_source(source);
            }
            entities.push(record);
        }
    }

    debug!(entity_count = entities.len(), "loaded entities from notes");
    Ok(entities)
}
