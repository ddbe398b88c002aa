//! Response parser: turns raw model output into entity records.
//!
//! Model output may or may not be pure JSON; models routinely wrap the
//! array in markdown fences or prose. Decoding is an explicit ordered
//! sequence of fallible strategies, short-circuiting on first success and
//! collapsing to an empty list (with a logged reason) on total failure.
//! Nothing in this module raises past its boundary.

use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::defaults::PARSE_WARN_TRUNCATE;
use crate::entity::{EntityRecord, EntityType};

/// Untrusted item shape as emitted by the model.
#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    entity_type: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source: Option<String>,
}

/// Strict decode of the entire payload as a JSON array.
fn decode_strict(raw: &str) -> Result<Vec<RawEntity>, serde_json::Error> {
    serde_json::from_str(raw.trim())
}

/// Decode the substring from the first `[` to the last `]`, which strips
/// markdown fences and surrounding prose.
fn decode_bracketed(raw: &str) -> Option<Vec<RawEntity>> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn truncate_for_display(raw: &str) -> String {
    if raw.chars().count() <= PARSE_WARN_TRUNCATE {
        raw.to_string()
    } else {
        let cut: String = raw.chars().take(PARSE_WARN_TRUNCATE).collect();
        format!("{cut}…")
    }
}

/// Parse raw model output into entity records.
///
/// Per-item validation: unknown type tags are dropped silently (routine,
/// not an error), names empty after trimming are dropped, and a missing
/// description becomes the empty string. Source attribution: an explicit
/// `source` field wins; otherwise the first of `fallback_sources` is used;
/// otherwise the record starts with no sources and the caller appends the
/// true source afterward.
pub fn parse_entities(raw: &str, fallback_sources: &[String]) -> Vec<EntityRecord> {
    let items = match decode_strict(raw) {
        Ok(items) => items,
        Err(_) => match decode_bracketed(raw) {
            Some(items) => items,
            None => {
                warn!(
                    response = %truncate_for_display(raw),
                    "could not parse model response as a JSON entity array"
                );
                return Vec::new();
            }
        },
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let Ok(entity_type) = EntityType::from_str(&item.entity_type) else {
            debug!(tag = %item.entity_type, "dropping item with unknown entity type");
            continue;
        };
        let name = item.name.trim();
        if name.is_empty() {
            continue;
        }

        let mut record = EntityRecord::new(name, entity_type, item.description);
        match item.source {
            Some(source) if !source.trim().is_empty() => record.push_source(source),
            _ => {
                if let Some(first) = fallback_sources.first() {
                    record.push_source(first.clone());
                }
            }
        }
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json_array() {
        let raw = r#"[
            {"name": "John Doe", "type": "person", "description": "A person"},
            {"name": "Acme Inc", "type": "organization", "description": "A company"}
        ]"#;
        let entities = parse_entities(raw, &[]);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "John Doe");
        assert_eq!(entities[0].entity_type, EntityType::Person);
        assert_eq!(entities[1].name, "Acme Inc");
        assert_eq!(entities[1].entity_type, EntityType::Organization);
    }

    #[test]
    fn test_parse_json_in_markdown_fence() {
        let raw = "```json\n[\n  {\"name\": \"Test\", \"type\": \"person\", \"description\": \"Test person\"}\n]\n```";
        let entities = parse_entities(raw, &[]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Test");
    }

    #[test]
    fn test_parse_invalid_payload_yields_empty() {
        assert!(parse_entities("not valid json", &[]).is_empty());
        assert!(parse_entities("", &[]).is_empty());
        assert!(parse_entities("][", &[]).is_empty());
    }

    #[test]
    fn test_parse_filters_unknown_types() {
        let raw = r#"[
            {"name": "Valid Person", "type": "person", "description": "A person"},
            {"name": "Invalid Type", "type": "invalid", "description": "Filtered"},
            {"name": "Another Valid", "type": "topic", "description": "A topic"}
        ]"#;
        let entities = parse_entities(raw, &[]);
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_parse_type_tag_case_insensitive() {
        let raw = r#"[{"name": "Acme", "type": "Organization", "description": ""}]"#;
        let entities = parse_entities(raw, &[]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_type, EntityType::Organization);
    }

    #[test]
    fn test_parse_drops_blank_names() {
        let raw = r#"[{"name": "   ", "type": "person", "description": "x"}]"#;
        assert!(parse_entities(raw, &[]).is_empty());
    }

    #[test]
    fn test_parse_missing_description_defaults_empty() {
        let raw = r#"[{"name": "Ada", "type": "person"}]"#;
        let entities = parse_entities(raw, &[]);
        assert_eq!(entities[0].description, "");
    }

    #[test]
    fn test_parse_explicit_source_wins_over_fallback() {
        let raw = r#"[{"name": "Ada", "type": "person", "source": "notes.md"}]"#;
        let fallback = vec!["first.md".to_string()];
        let entities = parse_entities(raw, &fallback);
        assert_eq!(entities[0].sources, vec!["notes.md"]);
    }

    #[test]
    fn test_parse_fallback_source_applied() {
        let raw = r#"[{"name": "Ada", "type": "person"}]"#;
        let fallback = vec!["first.md".to_string(), "second.md".to_string()];
        let entities = parse_entities(raw, &fallback);
        assert_eq!(entities[0].sources, vec!["first.md"]);
    }

    #[test]
    fn test_parse_no_fallback_leaves_sources_empty() {
        let raw = r#"[{"name": "Ada", "type": "person"}]"#;
        let entities = parse_entities(raw, &[]);
        assert!(entities[0].sources.is_empty());
    }
}
