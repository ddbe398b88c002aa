//! Configuration for mkgraph.
//!
//! Configuration is an explicit value loaded once at process start and
//! passed into every core entry point; core logic never reaches for an
//! ambient global. All queries fall back to built-in defaults so the core
//! functions correctly with no configuration supplied at all.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults;
use crate::entity::EntityType;
use crate::error::Result;

/// LLM provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider identifier: "openai", "anthropic", or "ollama".
    pub provider: String,
    /// Model slug override; each provider has its own default.
    pub model: Option<String>,
    /// Sampling temperature for extraction calls.
    pub temperature: f64,
    /// API key; providers also fall back to their environment variable.
    pub api_key: Option<String>,
    /// Base URL override, for Ollama or OpenAI-compatible endpoints.
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            temperature: defaults::TEMPERATURE,
            api_key: None,
            base_url: None,
        }
    }
}

/// Note template settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template used for newly created notes.
    pub body: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            body: defaults::NOTE_TEMPLATE.to_string(),
        }
    }
}

/// Per-entity-type overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTypeConfig {
    /// Output directory name override.
    pub directory: Option<String>,
    /// Note template override.
    pub template: Option<String>,
    /// Whether the type is extracted at all.
    pub enabled: bool,
}

impl Default for EntityTypeConfig {
    fn default() -> Self {
        Self {
            directory: None,
            template: None,
            enabled: true,
        }
    }
}

fn default_entity_types() -> Vec<String> {
    EntityType::ALL.iter().map(|t| t.tag().to_string()).collect()
}

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Enabled entity type tags.
    pub entity_types: Vec<String>,
    /// Per-type overrides, keyed by type tag.
    pub entity_type_config: BTreeMap<String, EntityTypeConfig>,
    /// LLM settings.
    pub llm: LlmConfig,
    /// Note template settings.
    pub template: TemplateConfig,
    /// Output directory name per type tag.
    pub output_directories: BTreeMap<String, String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            entity_types: default_entity_types(),
            entity_type_config: BTreeMap::new(),
            llm: LlmConfig::default(),
            template: TemplateConfig::default(),
            output_directories: BTreeMap::new(),
        }
    }
}

impl GraphConfig {
    /// Load configuration from `path`, or return defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(file = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Save configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Output directory name for an entity type.
    pub fn directory_for(&self, entity_type: EntityType) -> String {
        let tag = entity_type.tag();
        if let Some(dir) = self.output_directories.get(tag) {
            if !dir.is_empty() {
                return dir.clone();
            }
        }
        if let Some(cfg) = self.entity_type_config.get(tag) {
            if let Some(dir) = &cfg.directory {
                if !dir.is_empty() {
                    return dir.clone();
                }
            }
        }
        defaults::TYPE_DIRECTORIES
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, d)| d.to_string())
            .unwrap_or_else(|| format!("{}s", capitalize(tag)))
    }

    /// Note template for an entity type.
    pub fn template_for(&self, entity_type: EntityType) -> &str {
        if let Some(cfg) = self.entity_type_config.get(entity_type.tag()) {
            if let Some(template) = &cfg.template {
                return template;
            }
        }
        &self.template.body
    }

    /// Whether an entity type is enabled.
    pub fn is_enabled(&self, entity_type: EntityType) -> bool {
        let tag = entity_type.tag();
        if let Some(cfg) = self.entity_type_config.get(tag) {
            return cfg.enabled;
        }
        self.entity_types.iter().any(|t| t == tag)
    }

    /// Enabled types in canonical order.
    pub fn enabled_types(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|t| self.is_enabled(*t))
            .collect()
    }

    /// Look up a dotted config key for the CLI `config` command.
    pub fn get_value(&self, key: &str) -> Option<String> {
        match key {
            "entity_types" => Some(self.entity_types.join(",")),
            "llm.provider" => Some(self.llm.provider.clone()),
            "llm.model" => Some(self.llm.model.clone().unwrap_or_default()),
            "llm.temperature" => Some(self.llm.temperature.to_string()),
            "llm.base_url" => Some(self.llm.base_url.clone().unwrap_or_default()),
            _ => None,
        }
    }

    /// Set a dotted config key from a string value.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "llm.provider" => self.llm.provider = value.to_string(),
            "llm.model" => self.llm.model = Some(value.to_string()),
            "llm.base_url" => self.llm.base_url = Some(value.to_string()),
            "llm.api_key" => self.llm.api_key = Some(value.to_string()),
            "llm.temperature" => {
                self.llm.temperature = f64::from_str(value).map_err(|_| {
                    crate::Error::InvalidInput(format!("not a number: {value}"))
                })?;
            }
            other => {
                return Err(crate::Error::InvalidInput(format!(
                    "unknown config key: {other}"
                )));
            }
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
