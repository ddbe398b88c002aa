//! Entity model: the transient value objects produced by extraction.
//!
//! An [`EntityRecord`] lives only for the duration of a processing unit
//! (one file or one batch). Canonical records are projected onto notes and
//! discarded; the note, not the record, is the durable entity.

use serde::{Deserialize, Serialize};

use crate::merge::normalize_name;

/// Kind of extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Individual person mentioned by name.
    Person,
    /// Company, team, group, or institution.
    Organization,
    /// Project, product, concept, or event.
    Topic,
}

impl EntityType {
    /// All known entity types, in canonical order.
    pub const ALL: [EntityType; 3] = [
        EntityType::Person,
        EntityType::Organization,
        EntityType::Topic,
    ];

    /// Lowercase tag used in config keys, prompts, and model output.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Topic => "topic",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "person" => Ok(Self::Person),
            "organization" => Ok(Self::Organization),
            "topic" => Ok(Self::Topic),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// One extracted entity observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Display name as first seen in the source text (not re-normalized).
    pub name: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Free-text description, possibly empty.
    #[serde(default)]
    pub description: String,
    /// Source identifiers, insertion-ordered, no duplicates.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl EntityRecord {
    /// Create a record with no sources yet.
    pub fn new(
        name: impl Into<String>,
        entity_type: EntityType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type,
            description: description.into(),
            sources: Vec::new(),
        }
    }

    /// Insert a source identifier, preserving order and skipping duplicates.
    pub fn push_source(&mut self, source: impl Into<String>) {
        let source = source.into();
        if !self.sources.iter().any(|s| *s == source) {
            self.sources.push(source);
        }
    }

    /// Identity key used to decide whether two records denote the same
    /// entity: normalized name joined with the type tag.
    pub fn merge_key(&self) -> String {
        format!("{}:{}", normalize_name(&self.name), self.entity_type.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_entity_type_round_trip() {
        for ty in EntityType::ALL {
            assert_eq!(EntityType::from_str(ty.tag()).unwrap(), ty);
        }
    }

    #[test]
    fn test_entity_type_from_str_case_insensitive() {
        assert_eq!(EntityType::from_str("Person").unwrap(), EntityType::Person);
        assert_eq!(
            EntityType::from_str("  ORGANIZATION ").unwrap(),
            EntityType::Organization
        );
        assert!(EntityType::from_str("place").is_err());
    }

    #[test]
    fn test_push_source_deduplicates() {
        let mut record = EntityRecord::new("Acme Corp", EntityType::Organization, "");
        record.push_source("a.md");
        record.push_source("b.md");
        record.push_source("a.md");
        assert_eq!(record.sources, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_merge_key_normalizes_name() {
        let a = EntityRecord::new("John_Smith", EntityType::Person, "");
        let b = EntityRecord::new("john smith", EntityType::Person, "");
        assert_eq!(a.merge_key(), b.merge_key());

        let c = EntityRecord::new("john smith", EntityType::Topic, "");
        assert_ne!(a.merge_key(), c.merge_key());
    }

    #[test]
    fn test_record_serde_uses_type_tag() {
        let record = EntityRecord::new("Ada", EntityType::Person, "Mathematician");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "person");
        let back: EntityRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
