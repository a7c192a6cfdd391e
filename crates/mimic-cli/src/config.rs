//! Configuration file parsing for mimic.toml.

use mimic_clone::{EngineConfig, TextPolicy};
use mimic_core::HeapConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Heap settings
    #[serde(default)]
    pub heap: HeapSection,

    /// Cloning engine settings
    #[serde(default)]
    pub engine: EngineSection,
}

/// `[heap]` section.
#[derive(Debug, Deserialize)]
pub struct HeapSection {
    /// Object slots reserved up front
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Maximum number of live objects
    #[serde(default = "default_object_limit")]
    pub object_limit: usize,
}

impl Default for HeapSection {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            object_limit: default_object_limit(),
        }
    }
}

impl HeapSection {
    pub fn to_heap_config(&self) -> HeapConfig {
        HeapConfig {
            initial_capacity: self.initial_capacity,
            object_limit: self.object_limit,
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Deserialize)]
pub struct EngineSection {
    /// `copy` or `share`
    #[serde(default)]
    pub text_policy: TextPolicy,

    /// Identity map entries reserved per clone
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            text_policy: TextPolicy::default(),
            session_capacity: default_session_capacity(),
        }
    }
}

impl EngineSection {
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            text_policy: self.text_policy,
            session_capacity: self.session_capacity,
        }
    }
}

fn default_initial_capacity() -> usize {
    HeapConfig::default().initial_capacity
}

fn default_object_limit() -> usize {
    HeapConfig::default().object_limit
}

fn default_session_capacity() -> usize {
    EngineConfig::default().session_capacity
}

/// Load configuration from a file or search for default config files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path
        && !path.exists()
    {
        anyhow::bail!("config file {} not found", path.display());
    }

    match path.map(PathBuf::from).or_else(find_config_file) {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Search for configuration file in the current directory and parent directories.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    const CONFIG_NAMES: &[&str] = &["mimic.toml", ".mimic.toml"];

    let mut dir = Some(cwd.as_path());
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}
