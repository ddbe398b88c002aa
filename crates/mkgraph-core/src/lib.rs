//! # mkgraph-core
//!
//! Core types and processing engine for mkgraph.
//!
//! This crate owns the interesting parts of the system: the incremental
//! merge/update engine that reconciles newly extracted entities against
//! existing on-disk notes (and against each other within a batch), and the
//! change-tracking layer that decides which inputs need reprocessing.
//! The LLM transport, export renderers, and CLI live in sibling crates and
//! talk to this one through narrow interfaces.

pub mod config;
pub mod defaults;
pub mod entity;
pub mod error;
pub mod filename;
pub mod logging;
pub mod merge;
pub mod note;
pub mod parse;
pub mod processor;
pub mod state;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{EntityTypeConfig, GraphConfig, LlmConfig, TemplateConfig};
pub use entity::{EntityRecord, EntityType};
pub use error::{Error, Result};
pub use filename::note_filename;
pub use merge::{merge_entities, normalize_name};
pub use note::{synthesize, NoteDocument};
pub use parse::parse_entities;
pub use processor::{process_directory, process_file, ProcessOptions, RunSummary};
pub use state::{FileRecord, RunState};
pub use traits::{EntityExtractor, ExtractionRequest, SourceDocument};
