//! Configuration loading, validation, and management for the prompt refiner.
//!
//! Loads configuration from `~/.refiner/config.toml` with environment
//! variable overrides. Validates all settings before a packer is built from it.

pub mod logging;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use logging::LoggingConfig;

/// The root configuration structure.
///
/// Maps directly to `~/.refiner/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinerConfig {
    /// Budget and text rendering defaults
    #[serde(default)]
    pub packer: PackerConfig,

    /// Token counting backend
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// Structural overhead schedule for each render mode
    #[serde(default)]
    pub overhead: OverheadConfig,

    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default refinement pipeline, applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refine: Vec<OperationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Nominal token budget for a single render
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Fraction of the budget usable when tokens are estimated
    #[serde(default = "default_safety_factor")]
    pub safety_factor: f64,

    /// Separator between items in plain and tag-wrapped text output
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_max_tokens() -> usize {
    4096
}
fn default_safety_factor() -> f64 {
    0.9
}
fn default_separator() -> String {
    "\n\n".into()
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            safety_factor: default_safety_factor(),
            separator: default_separator(),
        }
    }
}

/// How tokens are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// Character-based estimate, budget reduced by the safety factor
    #[default]
    Estimate,
    /// Sub-word tokenizer loaded from `path`, full budget
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub mode: TokenizerMode,

    /// Path to a `tokenizer.json` (exact mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Characters per token for the estimator
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,
}

fn default_chars_per_token() -> usize {
    4
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            mode: TokenizerMode::Estimate,
            path: None,
            chars_per_token: default_chars_per_token(),
        }
    }
}

/// Fixed overhead constants, in tokens.
///
/// Chat mode charges `per_message` for every message envelope
/// (`<|im_start|>role\n...\n<|im_end|>`). Grouped text mode reserves
/// `grouped_reserved` once for its section headers and then charges each
/// item only its marginal cost inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadConfig {
    #[serde(default = "default_per_message")]
    pub per_message: usize,

    #[serde(default = "default_grouped_reserved")]
    pub grouped_reserved: usize,

    #[serde(default)]
    pub grouped_instruction: usize,

    #[serde(default = "default_grouped_context")]
    pub grouped_context: usize,

    #[serde(default = "default_grouped_conversation")]
    pub grouped_conversation: usize,
}

fn default_per_message() -> usize {
    4
}
fn default_grouped_reserved() -> usize {
    30
}
fn default_grouped_context() -> usize {
    3
}
fn default_grouped_conversation() -> usize {
    4
}

impl Default for OverheadConfig {
    fn default() -> Self {
        Self {
            per_message: default_per_message(),
            grouped_reserved: default_grouped_reserved(),
            grouped_instruction: 0,
            grouped_context: default_grouped_context(),
            grouped_conversation: default_grouped_conversation(),
        }
    }
}

/// One step of a refinement pipeline.
///
/// `kind` names the operation (`strip_html`, `truncate_tokens`, ...); all
/// other keys are operation-specific options and are checked when the
/// operation is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationConfig {
    pub kind: String,

    #[serde(flatten)]
    pub options: HashMap<String, serde_json::Value>,
}

impl OperationConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: HashMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

impl RefinerConfig {
    /// Load configuration from the default path (~/.refiner/config.toml).
    ///
    /// Environment variables override file values:
    /// - `REFINER_MAX_TOKENS`
    /// - `REFINER_TOKENIZER_PATH` (switches to exact mode)
    /// - `REFINER_LOG`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with(&config_path, |key| std::env::var(key).ok())
    }

    /// Parse `path`, apply overrides from `lookup`, then validate the result.
    ///
    /// Validation runs once, after overrides, so a file that is only
    /// complete together with its environment still loads.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::parse_file(path)?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("REFINER_MAX_TOKENS") {
            self.packer.max_tokens = raw.trim().parse().map_err(|_| ConfigError::EnvError {
                var: "REFINER_MAX_TOKENS".into(),
                reason: format!("expected a positive integer, got '{raw}'"),
            })?;
        }

        if let Some(path) = lookup("REFINER_TOKENIZER_PATH") {
            self.tokenizer.mode = TokenizerMode::Exact;
            self.tokenizer.path = Some(PathBuf::from(path));
        }

        if let Some(level) = lookup("REFINER_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".refiner")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packer.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "packer.max_tokens must be > 0".into(),
            ));
        }

        if !(self.packer.safety_factor > 0.0 && self.packer.safety_factor <= 1.0) {
            return Err(ConfigError::ValidationError(
                "packer.safety_factor must be in (0.0, 1.0]".into(),
            ));
        }

        if self.tokenizer.chars_per_token == 0 {
            return Err(ConfigError::ValidationError(
                "tokenizer.chars_per_token must be > 0".into(),
            ));
        }

        if self.tokenizer.mode == TokenizerMode::Exact && self.tokenizer.path.is_none() {
            return Err(ConfigError::ValidationError(
                "tokenizer.path is required in exact mode".into(),
            ));
        }

        if let Some(op) = self.refine.iter().find(|op| op.kind.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "refine step has an empty kind: {op:?}"
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            packer: PackerConfig::default(),
            tokenizer: TokenizerConfig::default(),
            overhead: OverheadConfig::default(),
            logging: LoggingConfig::default(),
            refine: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid value in {var}: {reason}")]
    EnvError { var: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for refiner_core::Error {
    fn from(err: ConfigError) -> Self {
        refiner_core::Error::Config {
            message: err.to_string(),
        }
    }
}
