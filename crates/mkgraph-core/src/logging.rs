//! Structured logging field name constants for mkgraph.
//!
//! All crates use these constants for consistent structured logging fields
//! so output can be filtered by standardized names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Run aborted, requires operator attention |
//! | WARN  | Recoverable issue (malformed model output, unreadable file) |
//! | INFO  | Lifecycle events, batch completions |
//! | DEBUG | Decision points (change filter, merge results, config choices) |
//! | TRACE | Per-entity and per-source iteration |

/// Subsystem originating the log event.
/// Values: "processor", "state", "parse", "note", "inference", "export"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "process_directory", "extract", "synthesize", "mark_processed"
pub const OPERATION: &str = "op";

/// Input file path being operated on.
pub const FILE: &str = "file";

/// Index of the batch within the run (zero-based).
pub const BATCH_INDEX: &str = "batch_index";

/// Number of files in scope for the current operation.
pub const FILE_COUNT: &str = "file_count";

/// Number of entities produced by a parse or merge step.
pub const ENTITY_COUNT: &str = "entity_count";

/// Number of note files written.
pub const NOTE_COUNT: &str = "note_count";

/// LLM provider identifier ("openai", "anthropic", "ollama").
pub const PROVIDER: &str = "provider";

/// Model slug used for an extraction call.
pub const MODEL: &str = "model";

/// Byte length of a prompt or response.
pub const RESPONSE_LEN: &str = "response_len";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";
