//! Directory processing orchestrator.
//!
//! Per run: `Discover → Filter → {Batch×N} → Finalize`. Batches execute
//! strictly in order because note files are shared mutable state across
//! batches (an entity discovered in batch 2 may append to a note created
//! in batch 1). Files are marked processed only after every note write for
//! their batch has completed, so a crash loses at most one batch of
//! already-extracted work and committed batches are never reprocessed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::GraphConfig;
use crate::defaults::{BATCH_SIZE, INPUT_EXTENSION, NOTE_EXTENSION};
use crate::entity::EntityRecord;
use crate::error::Result;
use crate::filename::note_filename;
use crate::merge::merge_entities;
use crate::note::synthesize;
use crate::parse::parse_entities;
use crate::state::RunState;
use crate::traits::{EntityExtractor, ExtractionRequest, SourceDocument};

/// Options for a directory processing run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Files per extraction call.
    pub batch_size: usize,
    /// Consult and update the change tracker.
    pub use_state: bool,
    /// Reprocess everything, ignoring stored fingerprints.
    pub force: bool,
    /// Where to persist run state after each committed batch. `None`
    /// keeps state in memory only.
    pub state_path: Option<PathBuf>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            use_state: true,
            force: false,
            state_path: None,
        }
    }
}

/// What a run did, for status output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_discovered: usize,
    pub files_selected: usize,
    pub batches: usize,
    pub entities: usize,
    pub notes_written: usize,
}

/// Recursively enumerate candidate input files, sorted for deterministic
/// batch boundaries.
pub fn discover_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            crate::Error::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "walk error")
            }))
        })?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map(|ext| ext == INPUT_EXTENSION)
                .unwrap_or(false)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Resolve model-attributed sources back to real input paths.
///
/// The batch prompt shows file names, not paths, so the model attributes
/// items by basename. Exact path matches are kept; basename matches map to
/// the full input path; anything else falls back to the batch's first file
/// so no observation is attributed outside the batch.
fn resolve_batch_sources(record: &mut EntityRecord, batch: &[SourceDocument]) {
    let resolved: Vec<String> = record
        .sources
        .iter()
        .map(|source| {
            if batch.iter().any(|d| d.source == *source) {
                return source.clone();
            }
            batch
                .iter()
                .find(|d| {
                    Path::new(&d.source)
                        .file_name()
                        .map(|n| n.to_string_lossy() == *source)
                        .unwrap_or(false)
                })
                .map(|d| d.source.clone())
                .unwrap_or_else(|| batch[0].source.clone())
        })
        .collect();

    record.sources.clear();
    for source in resolved {
        record.push_source(source);
    }
}

/// Write (or splice into) the note for one (entity, source) pair.
/// Returns true when bytes were written, false on a no-op.
fn write_note(
    entity: &EntityRecord,
    source: &str,
    output_dir: &Path,
    config: &GraphConfig,
) -> Result<bool> {
    let type_dir = output_dir.join(config.directory_for(entity.entity_type));
    fs::create_dir_all(&type_dir)?;

    let path = type_dir.join(format!(
        "{}.{NOTE_EXTENSION}",
        note_filename(&entity.name)
    ));
    let existing = if path.exists() {
        Some(fs::read_to_string(&path)?)
    } else {
        None
    };

    match synthesize(
        entity,
        existing.as_deref(),
        source,
        config.template_for(entity.entity_type),
    ) {
        Some(text) => {
            fs::write(&path, text)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn write_entity_notes(
    entities: &[EntityRecord],
    output_dir: &Path,
    config: &GraphConfig,
) -> Result<usize> {
    let mut written = 0;
    for entity in entities {
        for source in &entity.sources {
            if write_note(entity, source, output_dir, config)? {
                written += 1;
            }
        }
    }
    Ok(written)
}

/// Process a single input file: extract once, filter by enabled types,
/// write one note per entity. Bypasses batching and change tracking.
pub async fn process_file(
    path: &Path,
    output_dir: &Path,
    extractor: &dyn EntityExtractor,
    config: &GraphConfig,
) -> Result<Vec<EntityRecord>> {
    let source = path.to_string_lossy().into_owned();
    let content = fs::read_to_string(path)?;

    info!(file = %source, model = extractor.model_name(), "extracting entities");
    let raw = extractor
        .extract(&ExtractionRequest::Single(SourceDocument::new(
            source.clone(),
            content,
        )))
        .await?;

    let mut entities = parse_entities(&raw, std::slice::from_ref(&source));
    entities.retain(|e| config.is_enabled(e.entity_type));
    for entity in &mut entities {
        entity.push_source(source.clone());
    }

    let written = write_entity_notes(&entities, output_dir, config)?;
    info!(
        entity_count = entities.len(),
        note_count = written,
        "file processed"
    );
    Ok(entities)
}

/// Process a directory of input files.
///
/// Extraction or note-write failures abort the run; files of the failed
/// batch stay unmarked and are retried wholesale next run, which is safe
/// because note updates are idempotent.
pub async fn process_directory(
    input_dir: &Path,
    output_dir: &Path,
    extractor: &dyn EntityExtractor,
    config: &GraphConfig,
    state: &mut RunState,
    options: &ProcessOptions,
) -> Result<RunSummary> {
    let start = Instant::now();
    let mut summary = RunSummary::default();

    // Discover
    let candidates = discover_files(input_dir)?;
    summary.files_discovered = candidates.len();

    // Filter
    let selected: Vec<PathBuf> = if options.use_state && !options.force {
        state
            .filter_unprocessed(&candidates)
            .into_iter()
            .map(Path::to_path_buf)
            .collect()
    } else {
        candidates
    };
    summary.files_selected = selected.len();

    if selected.is_empty() {
        info!(
            file_count = summary.files_discovered,
            "no files need processing"
        );
        return Ok(summary);
    }
    info!(
        file_count = summary.files_discovered,
        selected = summary.files_selected,
        batch_size = options.batch_size,
        "processing directory"
    );

    // Batches, strictly in discovery order
    let batch_size = options.batch_size.max(1);
    for (batch_index, chunk) in selected.chunks(batch_size).enumerate() {
        let mut docs = Vec::with_capacity(chunk.len());
        for path in chunk {
            match fs::read_to_string(path) {
                Ok(content) => {
                    docs.push(SourceDocument::new(path.to_string_lossy(), content));
                }
                Err(e) => {
                    // Vanished since discovery; it stays unmarked and is
                    // retried next run.
                    warn!(file = %path.display(), error = %e, "skipping unreadable file");
                }
            }
        }
        if docs.is_empty() {
            continue;
        }

        debug!(
            batch_index,
            file_count = docs.len(),
            model = extractor.model_name(),
            "extracting batch"
        );
        let raw = extractor.extract(&ExtractionRequest::Batch(docs.clone())).await?;

        let fallback: Vec<String> = docs.iter().map(|d| d.source.clone()).collect();
        let mut entities = parse_entities(&raw, &fallback);
        entities.retain(|e| config.is_enabled(e.entity_type));
        for entity in &mut entities {
            resolve_batch_sources(entity, &docs);
        }
        let merged = merge_entities(vec![entities]);
        summary.entities += merged.len();

        summary.notes_written += write_entity_notes(&merged, output_dir, config)?;

        // Mark only after every write for this batch has landed
        if options.use_state {
            for doc in &docs {
                let path = Path::new(&doc.source);
                if let Err(e) = state.mark_processed(path) {
                    warn!(file = %doc.source, error = %e, "could not mark file processed");
                }
            }
            if let Some(state_path) = &options.state_path {
                state.save(state_path)?;
            }
        }
        summary.batches += 1;
        info!(
            batch_index,
            entity_count = merged.len(),
            "batch committed"
        );
    }

    // Finalize
    if options.use_state {
        state.finish_run();
        if let Some(state_path) = &options.state_path {
            state.save(state_path)?;
        }
    }
    info!(
        batches = summary.batches,
        entity_count = summary.entities,
        note_count = summary.notes_written,
        duration_ms = start.elapsed().as_millis() as u64,
        "run complete"
    );
    Ok(summary)
}
