//! Configuration loaded from `.promptmap.toml`.
//!
//! Every field has a documented default; malformed or absent configuration
//! falls back to those defaults and never aborts a run. The loaded value is
//! resolved once per analysis run and immutable thereafter.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PromptmapConfig {
    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub clients: ClientsConfig,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Per-rule tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Maximum token count a single prompt may reach before the token-budget
    /// rule fires. Counts above this threshold fail; the threshold itself
    /// passes.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Vocabulary indicating a task sensitive to output randomness; matched
    /// case-insensitively against message content by the temperature rule.
    #[serde(default = "default_precision_keywords")]
    pub precision_keywords: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            precision_keywords: default_precision_keywords(),
        }
    }
}

/// How API client objects are recognized in source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientsConfig {
    /// Type names whose `new` calls count as client construction; matched
    /// against the last segment of a qualified name (`OpenAI::Client`
    /// matches `Client`).
    #[serde(default = "default_client_classes")]
    pub classes: Vec<String>,

    /// Identifier substrings used as a last-resort heuristic for client
    /// variables.
    #[serde(default = "default_client_name_hints")]
    pub name_hints: Vec<String>,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            classes: default_client_classes(),
            name_hints: default_client_name_hints(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenizerConfig {
    /// Path to a `tokenizer.json` encoding profile. Absent or unreadable
    /// profiles fall back to character-based estimates.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub patterns: Vec<String>,
}

fn default_max_tokens() -> usize {
    4000
}

fn default_precision_keywords() -> Vec<String> {
    [
        "accurate",
        "accuracy",
        "precise",
        "precision",
        "exact",
        "exactly",
        "analyze",
        "analysis",
        "calculate",
        "calculation",
        "classify",
        "classification",
        "factual",
        "extract",
        "debug",
        "technical",
        "deterministic",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_client_classes() -> Vec<String> {
    vec!["Client".to_string()]
}

fn default_client_name_hints() -> Vec<String> {
    ["client", "openai", "llm", "gpt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Pure function to read config file contents
fn read_config_file(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

fn parse_config(contents: &str) -> Result<PromptmapConfig, String> {
    toml::from_str::<PromptmapConfig>(contents)
        .map_err(|e| format!("Failed to parse .promptmap.toml: {}", e))
}

/// Try loading config from a specific path; parse problems warn and fall
/// back rather than abort.
fn try_load_config_from_path(config_path: &Path) -> Option<PromptmapConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not read {}: {}", config_path.display(), e);
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            eprintln!("Warning: {}. Using defaults.", e);
            None
        }
    }
}

/// Load configuration from the nearest `.promptmap.toml`, searching the
/// current directory and a bounded number of ancestors.
pub fn load_config() -> PromptmapConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return PromptmapConfig::default();
        }
    };

    current
        .ancestors()
        .take(MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(".promptmap.toml"))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!("No .promptmap.toml found. Using default config.");
            PromptmapConfig::default()
        })
}
