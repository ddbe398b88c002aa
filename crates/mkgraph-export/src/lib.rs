//! # mkgraph-export
//!
//! Renders a note tree back into flat entity records and exports them as
//! JSON, GraphML, or a standalone interactive HTML visualization. Entities
//! are edges' nodes; two entities are linked when they share at least one
//! source.

pub mod graphml;
pub mod html;
pub mod json;
pub mod loader;

pub use graphml::export_to_graphml;
pub use html::export_to_html;
pub use json::export_to_json;
pub use loader::load_entities;

use mkgraph_core::EntityRecord;

/// Sources shared by two entities, in the first entity's order.
pub(crate) fn shared_sources(a: &EntityRecord, b: &EntityRecord) -> Vec<String> {
    a.sources
        .iter()
        .filter(|s| b.sources.contains(s))
        .cloned()
        .collect()
}

/// Undirected edges between entities sharing at least one source:
/// `(index_a, index_b, shared)` with `index_a < index_b`.
pub(crate) fn entity_links(entities: &[EntityRecord]) -> Vec<(usize, usize, Vec<String>)> {
    let mut links = Vec::new();
    for i in 0..entities.len() {
        for j in i + 1..entities.len() {
            let shared = shared_sources(&entities[i], &entities[j]);
            if !shared.is_empty() {
                links.push((i, j, shared));
            }
        }
    }
    links
}
