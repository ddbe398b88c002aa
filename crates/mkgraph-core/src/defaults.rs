//! Centralized default constants for mkgraph.
//!
//! **This module is the single source of truth** for all shared default
//! values. Other crates reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// PROCESSING
// =============================================================================

/// Number of input files grouped into one extraction call.
pub const BATCH_SIZE: usize = 5;

/// Input file extension selected during directory discovery.
pub const INPUT_EXTENSION: &str = "md";

/// Extension given to synthesized note files.
pub const NOTE_EXTENSION: &str = "md";

// =============================================================================
// PARSING
// =============================================================================

/// Maximum bytes of a malformed model response echoed into a warning.
pub const PARSE_WARN_TRUNCATE: usize = 200;

// =============================================================================
// NOTE LAYOUT
// =============================================================================

/// Default output directory per entity type: (type tag, directory name).
pub const TYPE_DIRECTORIES: &[(&str, &str)] = &[
    ("person", "People"),
    ("organization", "Organizations"),
    ("topic", "Topics"),
];

/// Fallback filename stem for display names that sanitize to nothing.
pub const UNNAMED_NOTE: &str = "unnamed";

/// Template used for newly created notes when no override is configured.
///
/// Placeholders: `{name}`, `{description}`, `{sources}` (JSON array),
/// `{sources_list}` (one `- <source>` line per source).
pub const NOTE_TEMPLATE: &str = "---\nsources: {sources}\n---\n\n# {name}\n\n{description}\n\n## Sources\n\n{sources_list}\n";

// =============================================================================
// LLM PROVIDERS
// =============================================================================

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default Ollama generation model.
pub const OLLAMA_MODEL: &str = "llama3.2";

/// Default OpenAI API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default OpenAI generation model.
pub const OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default Anthropic API endpoint.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com";

/// Default Anthropic generation model.
pub const ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Max tokens requested from the Anthropic messages API.
pub const ANTHROPIC_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature for extraction calls.
pub const TEMPERATURE: f64 = 0.3;

/// Timeout for extraction requests (seconds).
pub const EXTRACTION_TIMEOUT_SECS: u64 = 300;
