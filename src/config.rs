use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PlayConfig {
    /// Seed for the automatic step's tie-breaking; fresh entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub auto_concurrency: bool,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_include_zero_tokens")]
    pub include_zero_tokens: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            seed: None,
            auto_concurrency: false,
            max_steps: default_max_steps(),
            include_zero_tokens: default_include_zero_tokens(),
        }
    }
}

impl PlayConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: PlayConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }
}

fn default_max_steps() -> usize {
    100
}

fn default_include_zero_tokens() -> bool {
    true
}
