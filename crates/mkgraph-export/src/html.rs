//! Standalone interactive HTML visualization (D3 force graph).

use std::fs;
use std::path::Path;

use serde_json::json;

use mkgraph_core::{EntityRecord, EntityType, Result};

use crate::entity_links;

/// Maximum characters of a description carried into the tooltip data.
const DESCRIPTION_LIMIT: usize = 200;

fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

/// Render the entity list as a self-contained HTML document.
pub fn entities_to_html(entities: &[EntityRecord]) -> String {
    let nodes: Vec<_> = entities
        .iter()
        .enumerate()
        .map(|(i, e)| {
            json!({
                "id": i,
                "name": e.name,
                "type": e.entity_type.tag(),
                "description": e.description.chars().take(DESCRIPTION_LIMIT).collect::<String>(),
                "sources": e.sources,
            })
        })
        .collect();

    let links: Vec<_> = entity_links(entities)
        .into_iter()
        .map(|(i, j, shared)| {
            json!({
                "source": i,
                "target": j,
                "label": shared.iter().map(|s| file_stem(s)).collect::<Vec<_>>().join(", "),
            })
        })
        .collect();

    let people = entities.iter().filter(|e| e.entity_type == EntityType::Person).count();
    let orgs = entities
        .iter()
        .filter(|e| e.entity_type == EntityType::Organization)
        .count();
    let topics = entities.iter().filter(|e| e.entity_type == EntityType::Topic).count();

    let nodes_json = serde_json::to_string(&nodes).unwrap_or_else(|_| "[]".to_string());
    let links_json = serde_json::to_string(&links).unwrap_or_else(|_| "[]".to_string());
    let connections = links.len();

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Knowledge Graph</title>
    <script src="https://d3js.org/d3.v7.min.js"></script>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ margin-bottom: 20px; color: #666; }}
        #graph {{ width: 100%; height: 600px; border: 1px solid #ddd; background: white; border-radius: 8px; }}
        .node circle {{ stroke: #fff; stroke-width: 2px; cursor: pointer; }}
        .node text {{ font-size: 12px; }}
        .link {{ stroke: #999; stroke-opacity: 0.6; }}
    </style>
</head>
<body>
    <h1>Knowledge Graph</h1>
    <div class="stats">
        <strong>{people}</strong> people &middot;
        <strong>{orgs}</strong> organizations &middot;
        <strong>{topics}</strong> topics &middot;
        <strong>{connections}</strong> connections
    </div>
    <div id="graph"></div>

    <script type="text/javascript">
        const nodes = {nodes_json};
        const links = {links_json};

        const colors = {{ person: "#4fc3f7", organization: "#81c784", topic: "#ffb74d" }};

        const width = document.getElementById('graph').clientWidth;
        const height = 600;

        const svg = d3.select('#graph')
            .append('svg')
            .attr('width', width)
            .attr('height', height);

        const simulation = d3.forceSimulation(nodes)
            .force('link', d3.forceLink(links).id(d => d.id).distance(100))
            .force('charge', d3.forceManyBody().strength(-300))
            .force('center', d3.forceCenter(width / 2, height / 2));

        const link = svg.append('g')
            .selectAll('line')
            .data(links)
            .join('line')
            .attr('class', 'link')
            .attr('stroke-width', 2);

        const node = svg.append('g')
            .selectAll('g')
            .data(nodes)
            .join('g')
            .attr('class', 'node')
            .call(d3.drag()
                .on('start', dragstarted)
                .on('drag', dragged)
                .on('end', dragended));

        node.append('circle')
            .attr('r', 15)
            .attr('fill', d => colors[d.type]);

        node.append('text')
            .attr('dx', 18)
            .attr('dy', 4)
            .text(d => d.name);

        simulation.on('tick', () => {{
            link
                .attr('x1', d => d.source.x)
                .attr('y1', d => d.source.y)
                .attr('x2', d => d.target.x)
                .attr('y2', d => d.target.y);

            node.attr('transform', d => `translate(${{d.x}},${{d.y}})`);
        }});

        function dragstarted(event) {{
            if (!event.active) simulation.alphaTarget(0.3).restart();
            event.subject.fx = event.subject.x;
            event.subject.fy = event.subject.y;
        }}

        function dragged(event) {{
            event.subject.fx = event.x;
            event.subject.fy = event.y;
        }}

        function dragended(event) {{
            if (!event.active) simulation.alphaTarget(0);
            event.subject.fx = null;
            event.subject.fy = null;
        }}
    </script>
</body>
</html>
"##
    )
}

/// Write the entity list as a standalone HTML file.
pub fn export_to_html(entities: &[EntityRecord], output_path: &Path) -> Result<()> {
    fs::write(output_path, entities_to_html(entities))?;
    Ok(())
}
