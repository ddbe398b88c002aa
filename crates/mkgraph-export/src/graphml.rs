//! GraphML export.
//!
//! Nodes are entities; undirected edges connect entities sharing at least
//! one source, with the shared sources as edge data.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use mkgraph_core::{EntityRecord, Result};

use crate::entity_links;

/// Maximum characters of a description carried into node data.
const DESCRIPTION_LIMIT: usize = 500;

fn escape_xml(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&apos;".to_string(),
            c => c.to_string(),
        })
        .collect()
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Render the entity list as a GraphML document.
pub fn entities_to_graphml(entities: &[EntityRecord]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");

    for (id, name) in [(0, "label"), (1, "type"), (2, "description")] {
        let _ = writeln!(
            out,
            "  <key id=\"{id}\" for=\"node\" attr.name=\"{name}\" attr.type=\"string\" />"
        );
    }
    out.push_str("  <key id=\"3\" for=\"edge\" attr.name=\"source\" attr.type=\"string\" />\n");
    out.push_str("  <graph id=\"G\" edgedefault=\"undirected\">\n");

    for (i, entity) in entities.iter().enumerate() {
        let _ = writeln!(out, "    <node id=\"n{i}\">");
        let _ = writeln!(out, "      <data key=\"0\">{}</data>", escape_xml(&entity.name));
        let _ = writeln!(out, "      <data key=\"1\">{}</data>", entity.entity_type.tag());
        let _ = writeln!(
            out,
            "      <data key=\"2\">{}</data>",
            escape_xml(&truncate(&entity.description, DESCRIPTION_LIMIT))
        );
        out.push_str("    </node>\n");
    }

    for (i, j, shared) in entity_links(entities) {
        let _ = writeln!(
            out,
            "    <edge id=\"e{i}-{j}\" source=\"n{i}\" target=\"n{j}\">"
        );
        let _ = writeln!(
            out,
            "      <data key=\"3\">{}</data>",
            escape_xml(&shared.join(", "))
        );
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n</graphml>\n");
    out
}

/// Write the entity list as a GraphML file.
pub fn export_to_graphml(entities: &[EntityRecord], output_path: &Path) -> Result<()> {
    fs::write(output_path, entities_to_graphml(entities))?;
    Ok(())
}
