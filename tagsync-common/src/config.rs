//! Configuration loading and tag write policy
//!
//! Two layers:
//! 1. **TOML bootstrap**: logging and the default tag write policy, read once at startup
//! 2. **Per-call policy**: [`TagConfig`] values passed explicitly into every tag operation
//!
//! # Config File Priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`TAGSYNC_CONFIG`)
//! 3. Platform config directory (`<config_dir>/tagsync/config.toml`)
//! 4. Built-in defaults
//!
//! A missing config file is never fatal: a warning is logged and defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TAGSYNC_CONFIG";

/// When tag writes are allowed to touch files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Never write tags unless explicitly forced
    Disabled,
    /// Compute pending changes but leave writing to a later forced pass
    Deferred,
    /// Write tags as soon as catalog data differs from the file
    #[default]
    Sync,
}

/// Tag category that can be zeroed before comparison when scrubbing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrubCategory {
    /// The fixed MusicBrainz identifier set
    MusicBrainz,
    /// Genre list
    Genres,
    /// Publisher / record label
    Publisher,
    /// Medium format summary
    Media,
}

/// Tag write policy, passed into every orchestrator call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    /// Write gate
    #[serde(default)]
    pub write_mode: WriteMode,

    /// Embed the album cover into written files
    #[serde(default = "default_embed_cover_art")]
    pub embed_cover_art: bool,

    /// Strip existing tags before every write
    #[serde(default)]
    pub scrub_audio_tags: bool,

    /// Categories zeroed on both sides of the comparison when scrubbing
    #[serde(default = "default_scrub_categories")]
    pub scrub_categories: Vec<ScrubCategory>,
}

impl TagConfig {
    /// Create the default write policy
    pub fn new() -> Self {
        Self {
            write_mode: WriteMode::default(),
            embed_cover_art: default_embed_cover_art(),
            scrub_audio_tags: false,
            scrub_categories: default_scrub_categories(),
        }
    }

    /// Builder-style override of the write gate
    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// Builder-style override of cover embedding
    pub fn with_embed_cover_art(mut self, enabled: bool) -> Self {
        self.embed_cover_art = enabled;
        self
    }

    /// Builder-style override of the scrub toggle
    pub fn with_scrub_audio_tags(mut self, enabled: bool) -> Self {
        self.scrub_audio_tags = enabled;
        self
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Default tag write policy
    #[serde(default)]
    pub tags: TagConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_embed_cover_art() -> bool {
    true
}

fn default_scrub_categories() -> Vec<ScrubCategory> {
    vec![ScrubCategory::MusicBrainz]
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve which config file to use, if any
///
/// Returns `None` when no candidate exists, in which case built-in defaults apply.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("tagsync").join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_toml_config(&content)
}

/// Parse TOML text into a config
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    Ok(toml::from_str(content)?)
}

/// Load configuration with graceful degradation
///
/// Missing files fall back to defaults with a warning. A file that exists but
/// fails to parse is reported as an error, since silently ignoring it would
/// discard the user's write policy.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        debug!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(config = %path.display(), "Config file not found, using built-in defaults");
        return Ok(TomlConfig::default());
    }

    debug!(config = %path.display(), "Loading config file");
    load_toml_config(&path)
}
