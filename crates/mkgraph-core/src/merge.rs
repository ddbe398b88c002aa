//! Entity merger: reconciles observations of the same entity.
//!
//! Two extractions of "John_Smith" and "john smith" under the same type are
//! the same entity regardless of extraction order or batch boundary. The
//! merge result has stable first-seen iteration order so repeated runs
//! produce reproducible diffs.

use std::collections::HashMap;

use tracing::debug;

use crate::entity::EntityRecord;

/// Normalize a display name for identity comparison: lowercase, trimmed,
/// with `_` and `-` collapsed to single spaces.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for c in lowered.chars() {
        let c = if c == '_' || c == '-' { ' ' } else { c };
        if c.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    // A trailing separator run leaves one space behind
    out.trim_end().to_string()
}

/// Merge multiple lists of entity records into canonical records.
///
/// Records colliding on [`EntityRecord::merge_key`] are combined: source
/// lists are unioned preserving first-seen order, and the strictly longer
/// description wins (ties keep the earlier one). Merging never drops a
/// source. Result order is first-seen.
pub fn merge_entities(lists: Vec<Vec<EntityRecord>>) -> Vec<EntityRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, EntityRecord> = HashMap::new();

    for list in lists {
        for record in list {
            let key = record.merge_key();
            match by_key.get_mut(&key) {
                Some(existing) => {
                    for source in &record.sources {
                        existing.push_source(source.clone());
                    }
                    if record.description.len() > existing.description.len() {
                        existing.description = record.description;
                    }
                }
                None => {
                    order.push(key.clone());
                    by_key.insert(key, record);
                }
            }
        }
    }

    let merged: Vec<EntityRecord> = order
        .into_iter()
        .map(|key| by_key.remove(&key).expect("key recorded on insert"))
        .collect();
    debug!(entity_count = merged.len(), "merged entity lists");
    merged
}
