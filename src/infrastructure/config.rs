// Configuration for the srcequiv CLI.
//
// Loaded from `srcequiv.toml`, either given explicitly or discovered by
// walking up from the working directory. Every key is optional.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "srcequiv.toml";

/// Output format for comparison reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquivConfig {
    /// Character set label used to decode files for pattern matching.
    pub charset: String,
    pub format: OutputFormat,
    /// Worker threads for batch comparison; half the cores when unset.
    pub jobs: Option<usize>,
    /// File extensions considered by batch comparison.
    pub extensions: Vec<String>,
}

impl Default for EquivConfig {
    fn default() -> Self {
        Self {
            charset: "utf-8".to_string(),
            format: OutputFormat::Text,
            jobs: None,
            extensions: vec!["rs".to_string()],
        }
    }
}

impl EquivConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid srcequiv configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Load `custom` if given, else the nearest discovered file, else defaults.
    pub fn load(custom: Option<&Path>, start_dir: &Path) -> Result<Self> {
        if let Some(path) = custom {
            return Self::load_from_file(path);
        }
        match discover(start_dir) {
            Some(path) => {
                debug!("Found config: {}", path.display());
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Search `start_dir` and its ancestors for a config file.
pub fn discover(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
