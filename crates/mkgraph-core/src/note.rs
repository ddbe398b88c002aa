//! Note document model and synthesizer.
//!
//! A note is the durable unit of truth for one entity: a `---` delimited
//! metadata block whose `sources:` field holds a JSON list of source
//! identifiers, a body opening with a `# <display name>` heading and an
//! optional description, and a trailing `## Sources` section with one
//! `- <source>` line per source.
//!
//! Updates are structured parse-modify-render over this model, not line
//! surgery: the synthesizer owns exactly the metadata source list and the
//! sources section, and everything else round-trips verbatim. An update
//! that changes nothing returns `None` so callers never rewrite identical
//! bytes.

use tracing::trace;

use crate::entity::EntityRecord;

/// One line of the metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MetaLine {
    /// The managed `sources:` list.
    Sources(Vec<String>),
    /// Any other metadata line, preserved verbatim.
    Raw(String),
}

/// Parsed note file.
#[derive(Debug, Clone)]
pub struct NoteDocument {
    raw: String,
    metadata: Option<Vec<MetaLine>>,
    body: Vec<String>,
    /// Lines following the `## Sources` heading, verbatim. `None` when the
    /// note has no sources section.
    section: Option<Vec<String>>,
}

fn parse_sources_line(line: &str) -> Option<Vec<String>> {
    let rest = line.strip_prefix("sources:")?;
    serde_json::from_str::<Vec<String>>(rest.trim()).ok()
}

impl NoteDocument {
    /// Parse note text into its document model. Parsing never fails: text
    /// that matches no recognized region is carried in the body verbatim.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();

        let mut body_start = 0;
        let mut metadata = None;
        if lines.first().map(|l| l.trim_end() == "---").unwrap_or(false) {
            if let Some(close) = lines[1..].iter().position(|l| l.trim_end() == "---") {
                let block = lines[1..=close]
                    .iter()
                    .map(|l| match parse_sources_line(l) {
                        Some(sources) => MetaLine::Sources(sources),
                        None => MetaLine::Raw((*l).to_string()),
                    })
                    .collect();
                metadata = Some(block);
                body_start = close + 2;
            }
        }

        let heading_at = lines[body_start..]
            .iter()
            .rposition(|l| l.trim() == "## Sources")
            .map(|i| body_start + i);

        let (body, section) = match heading_at {
            Some(h) => (
                lines[body_start..h].iter().map(|l| l.to_string()).collect(),
                Some(lines[h + 1..].iter().map(|l| l.to_string()).collect()),
            ),
            None => (
                lines[body_start..].iter().map(|l| l.to_string()).collect(),
                None,
            ),
        };

        Self {
            raw: text.to_string(),
            metadata,
            body,
            section,
        }
    }

    /// Whether the source identifier already appears anywhere in the note.
    pub fn contains_source(&self, source: &str) -> bool {
        self.raw.contains(source)
    }

    /// Whether the given text already appears verbatim in the note.
    pub fn contains_text(&self, text: &str) -> bool {
        self.raw.contains(text)
    }

    /// Source list from the metadata block, if present.
    pub fn metadata_sources(&self) -> Option<&[String]> {
        self.metadata.as_ref()?.iter().find_map(|line| match line {
            MetaLine::Sources(sources) => Some(sources.as_slice()),
            MetaLine::Raw(_) => None,
        })
    }

    /// Source identifiers listed in the `## Sources` section.
    pub fn section_sources(&self) -> Vec<String> {
        self.section
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|l| l.trim().strip_prefix("- "))
            .map(|s| s.to_string())
            .collect()
    }

    /// First `# ` heading line of the body, without the marker.
    pub fn heading(&self) -> Option<&str> {
        self.body.iter().find_map(|l| l.strip_prefix("# ")).map(str::trim)
    }

    /// First non-blank, non-heading body paragraph line (the description).
    pub fn first_paragraph(&self) -> Option<&str> {
        self.body
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty() && !l.starts_with('#'))
    }

    /// Insert a source into the metadata list and sources section, keeping
    /// both in sync, without duplicating or reordering existing entries.
    fn add_source(&mut self, source: &str) {
        match &mut self.metadata {
            Some(block) => {
                let mut found = false;
                for line in block.iter_mut() {
                    if let MetaLine::Sources(sources) = line {
                        if !sources.iter().any(|s| s == source) {
                            sources.push(source.to_string());
                        }
                        found = true;
                        break;
                    }
                }
                if !found {
                    block.push(MetaLine::Sources(vec![source.to_string()]));
                }
            }
            None => {
                self.metadata = Some(vec![MetaLine::Sources(vec![source.to_string()])]);
            }
        }

        match &mut self.section {
            Some(lines) => {
                let insert_at = match lines
                    .iter()
                    .rposition(|l| l.trim_start().starts_with("- "))
                {
                    Some(i) => i + 1,
                    None => {
                        if lines.last().map(|l| l.is_empty()).unwrap_or(false) {
                            lines.len() - 1
                        } else {
                            lines.len()
                        }
                    }
                };
                lines.insert(insert_at, format!("- {source}"));
            }
            None => {
                while self.body.last().map(|l| l.is_empty()).unwrap_or(false) {
                    self.body.pop();
                }
                self.body.push(String::new());
                self.section = Some(vec![String::new(), format!("- {source}")]);
            }
        }
    }

    /// Append a description paragraph at the end of the body.
    fn append_paragraph(&mut self, text: &str) {
        while self.body.last().map(|l| l.is_empty()).unwrap_or(false) {
            self.body.pop();
        }
        self.body.push(String::new());
        self.body.push(text.to_string());
        self.body.push(String::new());
    }

    /// Render the document back to note text.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(block) = &self.metadata {
            lines.push("---".to_string());
            for line in block {
                match line {
                    MetaLine::Sources(sources) => {
                        let json = serde_json::to_string(sources)
                            .unwrap_or_else(|_| "[]".to_string());
                        lines.push(format!("sources: {json}"));
                    }
                    MetaLine::Raw(raw) => lines.push(raw.clone()),
                }
            }
            lines.push("---".to_string());
        }

        lines.extend(self.body.iter().cloned());

        if let Some(section) = &self.section {
            lines.push("## Sources".to_string());
            lines.extend(section.iter().cloned());
        }

        let mut out = lines.join("\n");
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

fn render_new(entity: &EntityRecord, source: &str, template: &str) -> String {
    let sources_json =
        serde_json::to_string(&[source]).unwrap_or_else(|_| "[]".to_string());
    template
        .replace("{name}", &entity.name)
        .replace("{description}", entity.description.trim())
        .replace("{sources}", &sources_json)
        .replace("{sources_list}", &format!("- {source}"))
}

/// Produce the new content for an entity's note, or `None` when the
/// existing note already fully covers this (entity, source) observation.
///
/// Branches:
/// - no existing note: render a fresh note from `template` with `source`
///   as the sole source;
/// - source already present: append the description if it is non-empty and
///   not already in the note, otherwise a true no-op;
/// - source absent: splice it into the metadata list and sources section
///   (and append a materially new description), leaving all other content
///   untouched.
pub fn synthesize(
    entity: &EntityRecord,
    existing: Option<&str>,
    source: &str,
    template: &str,
) -> Option<String> {
    let Some(text) = existing else {
        return Some(render_new(entity, source, template));
    };

    let mut doc = NoteDocument::parse(text);
    let description = entity.description.trim();
    let mut changed = false;

    if !doc.contains_source(source) {
        doc.add_source(source);
        changed = true;
    }
    if !description.is_empty() && !doc.contains_text(description) {
        doc.append_paragraph(description);
        changed = true;
    }

    if changed {
        trace!(entity = %entity.name, source, "note updated");
        Some(doc.render())
    } else {
        None
    }
}
