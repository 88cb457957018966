//! Configuration management for silktex

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::typeset::{Engine, OutputFormat};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub typesetter: TypesetterSettings,
}

/// Persisted typesetter preferences. `engine` is the canonical engine
/// name; an unknown name is rejected when a compile config is assembled,
/// not here, so a stale config file still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesetterSettings {
    pub engine: String,
    pub synctex: bool,
    pub shell_escape: bool,
    pub output_format: OutputFormat,
    /// Build directory; the document's own directory when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            typesetter: TypesetterSettings::default(),
        }
    }
}

impl Default for TypesetterSettings {
    fn default() -> Self {
        Self {
            engine: Engine::PdfLatex.name().to_string(),
            synctex: true,
            shell_escape: false,
            output_format: OutputFormat::Pdf,
            output_dir: None,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "silktex")
            .map(|proj_dirs| proj_dirs.config_dir().join("silktex.toml"))
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Whether the persisted typesetter setting names the given engine.
    /// Exactly one engine is active at a time; a configured engine with
    /// no installed binary is still active (the compile fails at run
    /// time, not here).
    pub fn active(&self, engine: Engine) -> bool {
        self.typesetter.engine == engine.name()
    }
}
